use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use super::*;
use crate::error::RemoteFault;
use crate::testing::ScriptedTransport;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn reply(procedure: &str, result: Value) -> Value {
    json!({ format!("{procedure}Result"): result })
}

/// Answers `true` to every procedure.
fn accepting() -> ShopClient<ScriptedTransport> {
    ShopClient::new(ScriptedTransport::new(|procedure, _| reply(procedure, json!(true))))
}

/// One order per window, with the window's month as the order id.
fn monthly_orders() -> ShopClient<ScriptedTransport> {
    ShopClient::new(ScriptedTransport::new(|procedure, args| {
        let start = args["Start"].as_str().unwrap_or_default().to_owned();
        let month: i64 = start.get(5..7).and_then(|m| m.parse().ok()).unwrap_or(0);
        reply(procedure, json!({ "item": { "Id": month, "Placed": start } }))
    }))
}

static NULL: Value = Value::Null;

fn arg<'a>(call: &'a (String, Args), key: &str) -> &'a Value {
    call.1.get(key).unwrap_or(&NULL)
}

// ---------------------------------------------------------------------------
// field projection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_fields_canonicalizes_and_targets_entity_procedure() {
    let mut client = accepting();
    let accepted = client
        .set_fields(EntityKind::Order, &["id", "orderlines"])
        .await
        .unwrap();

    assert!(accepted);
    let calls = client.session().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Order_SetFields");
    assert_eq!(arg(&calls[0], "Fields"), &json!("Id,Orderlines"));
    assert_eq!(
        client.declared_fields(EntityKind::Order),
        Some(&["Id".to_string(), "Orderlines".to_string()][..])
    );
}

#[tokio::test]
async fn set_fields_for_order_lines_uses_order_namespace() {
    let mut client = accepting();
    client
        .set_fields(EntityKind::OrderLine, &["sku", "quantity"])
        .await
        .unwrap();
    assert_eq!(client.session().procedures(), vec!["Order_SetOrderLineFields"]);
}

#[tokio::test]
async fn rejected_projection_is_false_not_an_error() {
    let mut client = ShopClient::new(ScriptedTransport::new(|procedure, args| {
        let accept = args["Fields"] != json!("Bogus");
        reply(procedure, json!(accept))
    }));

    assert!(client.set_fields(EntityKind::User, &["id"]).await.unwrap());
    assert!(!client.set_fields(EntityKind::User, &["bogus"]).await.unwrap());
    // The remote side keeps the last projection it accepted.
    assert_eq!(
        client.declared_fields(EntityKind::User),
        Some(&["Id".to_string()][..])
    );
}

#[tokio::test]
async fn set_fields_with_non_boolean_reply_is_a_type_mismatch() {
    let mut client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(procedure, json!({ "Id": 1 }))
    }));
    let err = client
        .set_fields(EntityKind::Product, &["id"])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ShopError::TypeMismatch { ref procedure, .. } if procedure == "Product_SetFields"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn reapply_fields_resends_last_declaration() {
    let mut client = accepting();
    assert!(client
        .reapply_fields(EntityKind::Category)
        .await
        .unwrap()
        .is_none());
    assert!(client.session().calls().is_empty());

    client
        .set_fields(EntityKind::Category, &["id", "fileName"])
        .await
        .unwrap();
    let resent = client.reapply_fields(EntityKind::Category).await.unwrap();

    assert_eq!(resent, Some(true));
    let calls = client.session().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(arg(&calls[1], "Fields"), &json!("Id,FileName"));
}

#[tokio::test]
async fn projection_without_id_still_hydrates_orders() {
    let mut client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        if procedure.ends_with("_SetFields") {
            reply(procedure, json!(true))
        } else {
            reply(procedure, json!({ "item": [ { "Status": 2, "Comment": "x" } ] }))
        }
    }));

    assert!(client
        .set_fields(EntityKind::Order, &["status", "comment"])
        .await
        .unwrap());
    let orders = client.fetch_orders(None, None, &[]).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, None);
    assert_eq!(orders[0].fields["Status"], 2);
    assert_eq!(orders[0].fields["Comment"], "x");
}

// ---------------------------------------------------------------------------
// batched range fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batched_fetch_issues_one_call_per_month_window() {
    let client = monthly_orders();
    let orders = client
        .fetch_orders_from_until(date(2024, 1, 1), at(2024, 3, 15, 9), &[1, 2])
        .await
        .unwrap();

    let calls = client.session().calls();
    let bounds: Vec<(&Value, &Value)> = calls
        .iter()
        .map(|c| (arg(c, "Start"), arg(c, "End")))
        .collect();
    assert_eq!(
        bounds,
        vec![
            (&json!("2024-01-01"), &json!("2024-02-01")),
            (&json!("2024-02-02"), &json!("2024-03-02")),
            (&json!("2024-03-03"), &json!("2024-04-03")),
        ]
    );
    assert!(calls.iter().all(|c| c.0 == "Order_GetOrders"));
    assert!(calls.iter().all(|c| arg(c, "Status") == &json!("1,2")));

    let ids: Vec<Option<i64>> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)], "results must follow call order");
}

#[tokio::test]
async fn batched_fetch_within_one_window_issues_one_call() {
    let client = monthly_orders();
    let orders = client
        .fetch_orders_from_until(date(2024, 3, 1), at(2024, 3, 20, 18), &[4])
        .await
        .unwrap();
    assert_eq!(client.session().calls().len(), 1);
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn batched_fetch_keeps_status_order_and_repeats() {
    let client = monthly_orders();
    client
        .fetch_orders_from_until(date(2024, 3, 1), at(2024, 3, 20, 18), &[7, 2, 7])
        .await
        .unwrap();
    let calls = client.session().calls();
    assert_eq!(arg(&calls[0], "Status"), &json!("7,2,7"));
}

#[tokio::test]
async fn batched_fetch_stops_at_first_failing_window() {
    let client = ShopClient::new(ScriptedTransport::fallible(|procedure, args| {
        if args["Start"] == json!("2024-02-02") {
            return Err(ShopError::RemoteCall {
                procedure: procedure.to_owned(),
                cause: RemoteFault::Fault("response too large".to_owned()),
            });
        }
        Ok(reply(procedure, json!({ "item": [] })))
    }));

    let err = client
        .fetch_orders_from_until(date(2024, 1, 1), at(2024, 6, 1, 0), &[])
        .await
        .unwrap_err();

    assert!(
        matches!(err, ShopError::RemoteCall { ref procedure, .. } if procedure == "Order_GetOrders"),
        "got: {err:?}"
    );
    assert_eq!(client.session().calls().len(), 2);
}

#[tokio::test]
async fn closed_range_fetch_stops_at_last_day() {
    let client = monthly_orders();
    client
        .fetch_orders_through(date(2024, 1, 1), date(2024, 1, 15), &[])
        .await
        .unwrap();
    let calls = client.session().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(arg(&calls[0], "Start"), &json!("2024-01-01"));
    assert_eq!(arg(&calls[0], "End"), &json!("2024-01-15"));
    assert_eq!(arg(&calls[0], "Status"), &Value::Null);
}

#[tokio::test]
async fn closed_range_fetch_trims_only_the_final_window() {
    let client = monthly_orders();
    client
        .fetch_orders_through(date(2024, 1, 1), date(2024, 2, 10), &[2])
        .await
        .unwrap();
    let calls = client.session().calls();
    let bounds: Vec<(&Value, &Value)> = calls
        .iter()
        .map(|c| (arg(c, "Start"), arg(c, "End")))
        .collect();
    assert_eq!(
        bounds,
        vec![
            (&json!("2024-01-01"), &json!("2024-02-01")),
            (&json!("2024-02-02"), &json!("2024-02-10")),
        ]
    );
    assert!(calls.iter().all(|c| arg(c, "Status") == &json!("2")));
}

#[tokio::test]
async fn single_window_fetch_sends_open_bounds_as_null() {
    let client = monthly_orders();
    client.fetch_orders(None, None, &[]).await.unwrap();
    let calls = client.session().calls();
    assert_eq!(arg(&calls[0], "Start"), &Value::Null);
    assert_eq!(arg(&calls[0], "End"), &Value::Null);
    assert_eq!(arg(&calls[0], "Status"), &Value::Null);
}

#[tokio::test]
async fn single_window_fetch_formats_calendar_dates() {
    let client = monthly_orders();
    client
        .fetch_orders(Some(date(2023, 11, 5)), Some(date(2023, 12, 5)), &[3, 1])
        .await
        .unwrap();
    let calls = client.session().calls();
    assert_eq!(arg(&calls[0], "Start"), &json!("2023-11-05"));
    assert_eq!(arg(&calls[0], "End"), &json!("2023-12-05"));
    assert_eq!(arg(&calls[0], "Status"), &json!("3,1"));
}

// ---------------------------------------------------------------------------
// caches
// ---------------------------------------------------------------------------

fn users_client() -> ShopClient<ScriptedTransport> {
    ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(
            procedure,
            json!({ "item": [
                { "Id": 1, "Name": "Ada" },
                { "Id": "2", "Name": "Bo" },
                { "Id": 1, "Name": "Ada Lovelace" }
            ] }),
        )
    }))
}

#[tokio::test]
async fn get_users_with_cache_fetches_once() {
    let mut client = users_client();

    let first = client.get_users(true).await.unwrap().len();
    let second = client.get_users(true).await.unwrap().len();

    assert_eq!(first, 2);
    assert_eq!(second, 2);
    assert_eq!(client.session().procedures(), vec!["User_GetUsers"]);
}

#[tokio::test]
async fn get_users_without_cache_refetches() {
    let mut client = users_client();
    client.get_users(true).await.unwrap();
    client.get_users(false).await.unwrap();
    client.get_users(true).await.unwrap();
    assert_eq!(client.session().calls().len(), 2);
}

#[tokio::test]
async fn get_users_duplicate_id_keeps_later_record() {
    let mut client = users_client();
    let users = client.get_users(false).await.unwrap();
    assert_eq!(users[&1].fields["Name"], "Ada Lovelace");
    assert_eq!(users[&2].fields["Name"], "Bo");
}

#[tokio::test]
async fn failed_refresh_keeps_previous_cache() {
    use std::sync::atomic::{AtomicU32, Ordering};

    let calls = AtomicU32::new(0);
    let mut client = ShopClient::new(ScriptedTransport::fallible(move |procedure, _| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(reply(procedure, json!({ "item": { "Id": 5 } })))
        } else {
            Ok(json!({ "unexpected": true }))
        }
    }));

    client.get_users(true).await.unwrap();
    let err = client.get_users(false).await.unwrap_err();
    assert!(matches!(err, ShopError::MalformedResponse { .. }));

    let cached = client.get_users(true).await.unwrap();
    assert!(cached.contains_key(&5));
}

#[tokio::test]
async fn get_orders_caches_recent_window() {
    let mut client = monthly_orders().with_recent_orders(RecentOrders {
        days: 3,
        statuses: vec![2, 1],
    });

    let count = client.get_orders(true).await.unwrap().len();
    client.get_orders(true).await.unwrap();

    assert_eq!(count, 1);
    let calls = client.session().calls();
    assert_eq!(calls.len(), 1);
    assert!(arg(&calls[0], "Start").is_string());
    assert_eq!(arg(&calls[0], "End"), &Value::Null);
    assert_eq!(arg(&calls[0], "Status"), &json!("2,1"));

    client.get_orders(false).await.unwrap();
    assert_eq!(client.session().calls().len(), 2);
}

// ---------------------------------------------------------------------------
// entity calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_order_with_empty_result_fails() {
    let client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(procedure, json!({ "item": [] }))
    }));
    let err = client.get_order(99).await.unwrap_err();
    assert!(
        matches!(err, ShopError::EmptyResult { ref procedure } if procedure == "Order_GetOrder"),
        "got: {err:?}"
    );
    assert_eq!(arg(&client.session().calls()[0], "OrderId"), &json!(99));
}

#[tokio::test]
async fn get_order_accepts_bare_record() {
    let client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(procedure, json!({ "Id": 12, "Comment": "leave at door" }))
    }));
    let order = client.get_order(12).await.unwrap();
    assert_eq!(order.id, Some(12));
    assert_eq!(order.fields["Comment"], "leave at door");
}

#[tokio::test]
async fn fetch_orders_by_user_accepts_bare_record_as_single_order() {
    let client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(procedure, json!({ "Id": 12 }))
    }));
    let orders = client.fetch_orders_by_user(3).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(client.session().procedures(), vec!["Order_GetOrdersByUser"]);
}

#[tokio::test]
async fn fetch_orders_updated_sends_timestamps() {
    let client = monthly_orders();
    client
        .fetch_orders_updated(at(2024, 5, 1, 8), Some(at(2024, 5, 2, 17)), &[5])
        .await
        .unwrap();
    let calls = client.session().calls();
    assert_eq!(calls[0].0, "Order_GetOrdersUpdated");
    assert_eq!(arg(&calls[0], "Start"), &json!("2024-05-01 08:00:00"));
    assert_eq!(arg(&calls[0], "End"), &json!("2024-05-02 17:00:00"));
    assert_eq!(arg(&calls[0], "Status"), &json!("5"));
}

#[tokio::test]
async fn update_calls_return_remote_boolean() {
    let client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(procedure, json!(procedure != "Order_UpdateComment"))
    }));

    assert!(client.update_order_status(1, 4).await.unwrap());
    assert!(!client.update_order_comment(1, "gift wrap").await.unwrap());
    assert!(client.delete_order(1).await.unwrap());

    let calls = client.session().calls();
    assert_eq!(arg(&calls[0], "Status"), &json!(4));
    assert_eq!(arg(&calls[1], "Comment"), &json!("gift wrap"));
    assert_eq!(calls[2].0, "Order_Delete");
}

#[tokio::test]
async fn products_get_image_paths_from_client_assets() {
    let client = ShopClient::new(ScriptedTransport::new(|procedure, _| {
        reply(
            procedure,
            json!([
                { "Id": 1, "FileName": "mug.jpg" },
                { "Id": 2 }
            ]),
        )
    }))
    .with_assets(Some(AssetUrl::new(12, "webshopapp.net")));

    let products = client.search_products("mug").await.unwrap();

    assert_eq!(
        products[0].file_path.as_deref(),
        Some("https://shop12.webshopapp.net/upload_dir/shop/mug.jpg")
    );
    assert!(products[1].file_path.is_none());
    assert_eq!(arg(&client.session().calls()[0], "Search"), &json!("mug"));
}

#[tokio::test]
async fn remote_failure_carries_procedure_name() {
    let client = ShopClient::new(ScriptedTransport::fallible(|procedure, _| {
        Err(ShopError::RemoteCall {
            procedure: procedure.to_owned(),
            cause: RemoteFault::Status { status: 503 },
        })
    }));
    let err = client.get_categories().await.unwrap_err();
    assert!(
        matches!(err, ShopError::RemoteCall { ref procedure, cause: RemoteFault::Status { status: 503 } }
            if procedure == "Category_GetCategories"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn envelope_without_result_key_is_malformed() {
    let client = ShopClient::new(ScriptedTransport::new(|_, _| json!({ "Other": [] })));
    let err = client.get_deliveries().await.unwrap_err();
    assert!(
        matches!(err, ShopError::MalformedResponse { ref procedure, .. } if procedure == "Delivery_GetDeliveryMethods"),
        "got: {err:?}"
    );
}
