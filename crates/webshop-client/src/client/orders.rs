//! Order retrieval, including the month-batched range fetch.

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::ShopError;
use crate::session::Transport;
use crate::types::Order;
use crate::window::{
    date_arg, datetime_arg, plan_windows, plan_windows_through, status_arg, DateWindow,
};

use super::{args, ShopClient};

impl<T: Transport> ShopClient<T> {
    /// Fetches one order by id.
    ///
    /// # Errors
    ///
    /// - [`ShopError::EmptyResult`] if no order came back.
    /// - Any error from [`Self::call`] or hydration.
    pub async fn get_order(&self, order_id: i64) -> Result<Order, ShopError> {
        self.fetch_one("Order_GetOrder", args([("OrderId", Value::from(order_id))]))
            .await
    }

    /// Fetches orders placed between `start` and `end` with one bounded call.
    ///
    /// Bounds are sent as calendar dates; `None` leaves that side open. The
    /// status filter is sent in the order given, without sorting or
    /// de-duplication; an empty filter matches every status.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn fetch_orders(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        statuses: &[u32],
    ) -> Result<Vec<Order>, ShopError> {
        self.fetch_many(
            "Order_GetOrders",
            args([
                ("Start", date_arg(start)),
                ("End", date_arg(end)),
                ("Status", status_arg(statuses)),
            ]),
        )
        .await
    }

    /// Fetches every order from `start` until now, one month window per call.
    ///
    /// # Errors
    ///
    /// Stops at the first failing window and returns its error; orders from
    /// earlier windows are discarded.
    pub async fn fetch_orders_from(
        &self,
        start: NaiveDate,
        statuses: &[u32],
    ) -> Result<Vec<Order>, ShopError> {
        self.fetch_orders_from_until(start, Local::now().naive_local(), statuses)
            .await
    }

    /// [`Self::fetch_orders_from`] with an explicit notion of "now".
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_orders_from`].
    pub async fn fetch_orders_from_until(
        &self,
        start: NaiveDate,
        now: NaiveDateTime,
        statuses: &[u32],
    ) -> Result<Vec<Order>, ShopError> {
        self.fetch_windows(&plan_windows(start, now, statuses)).await
    }

    /// Fetches every order placed from `start` through `last_day`, both
    /// inclusive, one month window per call. The final window ends on
    /// `last_day`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_orders_from`].
    pub async fn fetch_orders_through(
        &self,
        start: NaiveDate,
        last_day: NaiveDate,
        statuses: &[u32],
    ) -> Result<Vec<Order>, ShopError> {
        self.fetch_windows(&plan_windows_through(start, last_day, statuses))
            .await
    }

    /// Fetches all orders placed by one user.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn fetch_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, ShopError> {
        self.fetch_many(
            "Order_GetOrdersByUser",
            args([("UserId", Value::from(user_id))]),
        )
        .await
    }

    /// Fetches orders whose last update falls between `since` and `until`.
    ///
    /// Bounds are sent as `YYYY-MM-DD HH:MM:SS`; `until = None` is open-ended.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn fetch_orders_updated(
        &self,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
        statuses: &[u32],
    ) -> Result<Vec<Order>, ShopError> {
        self.fetch_many(
            "Order_GetOrdersUpdated",
            args([
                ("Start", datetime_arg(Some(since))),
                ("End", datetime_arg(until)),
                ("Status", status_arg(statuses)),
            ]),
        )
        .await
    }

    /// Recent orders: the configured trailing days with the configured status
    /// allow-list, memoized until called with `use_cache = false`.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::fetch_orders`]. The cache is left untouched on
    /// failure.
    pub async fn get_orders(&mut self, use_cache: bool) -> Result<&[Order], ShopError> {
        if use_cache && self.cache.recent_orders.is_some() {
            tracing::debug!("recent orders served from cache");
        } else {
            let today = Local::now().date_naive();
            let start = today
                .checked_sub_days(Days::new(u64::from(self.recent.days)))
                .unwrap_or(today);
            let orders = self
                .fetch_orders(Some(start), None, &self.recent.statuses)
                .await?;
            self.cache.recent_orders = Some(orders);
        }
        Ok(self.cache.recent_orders.get_or_insert_with(Vec::new).as_slice())
    }

    /// Sets the status code of an order. `false` means the remote side refused.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn update_order_status(&self, order_id: i64, status: u32) -> Result<bool, ShopError> {
        self.call_bool(
            "Order_UpdateStatus",
            args([
                ("OrderId", Value::from(order_id)),
                ("Status", Value::from(status)),
            ]),
        )
        .await
    }

    /// Replaces the comment on an order. `false` means the remote side refused.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn update_order_comment(
        &self,
        order_id: i64,
        comment: &str,
    ) -> Result<bool, ShopError> {
        self.call_bool(
            "Order_UpdateComment",
            args([
                ("OrderId", Value::from(order_id)),
                ("Comment", Value::from(comment)),
            ]),
        )
        .await
    }

    /// Deletes an order. `false` means the remote side refused.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn delete_order(&self, order_id: i64) -> Result<bool, ShopError> {
        self.call_bool("Order_Delete", args([("OrderId", Value::from(order_id))]))
            .await
    }

    async fn fetch_windows(&self, windows: &[DateWindow]) -> Result<Vec<Order>, ShopError> {
        let mut orders = Vec::new();

        for window in windows {
            let batch = self
                .fetch_orders(Some(window.start), Some(window.end), &window.statuses)
                .await?;
            tracing::debug!(
                start = %window.start,
                end = %window.end,
                statuses = ?window.statuses,
                orders = batch.len(),
                "fetched order window"
            );
            orders.extend(batch);
        }

        tracing::info!(
            windows = windows.len(),
            orders = orders.len(),
            "batched order fetch complete"
        );
        Ok(orders)
    }
}
