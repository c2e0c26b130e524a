//! Command handlers. Each prints its result as pretty JSON on stdout.

use chrono::NaiveDate;
use serde::Serialize;
use webshop_client::{EntityKind, ShopClient};

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fails the command when the remote side answered `false`.
fn require_accepted(accepted: bool, what: &str) -> anyhow::Result<()> {
    if accepted {
        println!("{what}: ok");
        Ok(())
    } else {
        anyhow::bail!("{what}: rejected by the shop")
    }
}

pub(crate) async fn users(client: &mut ShopClient) -> anyhow::Result<()> {
    let users = client.get_users(false).await?;
    let mut sorted: Vec<_> = users.values().collect();
    sorted.sort_by_key(|u| u.id);
    print_json(&sorted)
}

pub(crate) async fn orders(
    client: &ShopClient,
    from: NaiveDate,
    until: Option<NaiveDate>,
    statuses: &[u32],
) -> anyhow::Result<()> {
    let orders = match until {
        Some(last_day) => client.fetch_orders_through(from, last_day, statuses).await?,
        None => client.fetch_orders_from(from, statuses).await?,
    };
    eprintln!("{} orders", orders.len());
    print_json(&orders)
}

pub(crate) async fn recent(client: &mut ShopClient) -> anyhow::Result<()> {
    let orders = client.get_orders(false).await?;
    print_json(orders)
}

pub(crate) async fn order(client: &ShopClient, id: i64) -> anyhow::Result<()> {
    let order = client.get_order(id).await?;
    let lines = order.order_lines()?;
    print_json(&order)?;
    eprintln!("{} order lines", lines.len());
    Ok(())
}

pub(crate) async fn products(client: &ShopClient, search: Option<&str>) -> anyhow::Result<()> {
    let products = match search {
        Some(query) => client.search_products(query).await?,
        None => client.get_products().await?,
    };
    print_json(&products)
}

pub(crate) async fn categories(client: &ShopClient) -> anyhow::Result<()> {
    print_json(&client.get_categories().await?)
}

pub(crate) async fn deliveries(client: &ShopClient) -> anyhow::Result<()> {
    print_json(&client.get_deliveries().await?)
}

/// Applies a field projection; a rejected projection aborts the run, since
/// the command that follows would return a different shape than asked for.
pub(crate) async fn project(
    client: &mut ShopClient,
    entity: EntityKind,
    fields: &[String],
) -> anyhow::Result<()> {
    let accepted = client.set_fields(entity, fields).await?;
    if accepted {
        tracing::info!(%entity, "field projection applied");
        Ok(())
    } else {
        anyhow::bail!("{entity} field projection: rejected by the shop")
    }
}

pub(crate) async fn set_status(client: &ShopClient, id: i64, status: u32) -> anyhow::Result<()> {
    let accepted = client.update_order_status(id, status).await?;
    require_accepted(accepted, &format!("order {id} status"))
}

pub(crate) async fn comment(client: &ShopClient, id: i64, comment: &str) -> anyhow::Result<()> {
    let accepted = client.update_order_comment(id, comment).await?;
    require_accepted(accepted, &format!("order {id} comment"))
}
