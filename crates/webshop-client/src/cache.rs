//! In-memory memoization of the "all users" and "recent orders" results.
//!
//! Entries never expire. They are replaced only when the caller asks for a
//! fresh fetch by passing `use_cache = false`.

use std::collections::HashMap;

use crate::types::{Order, User};

#[derive(Debug, Default)]
pub(crate) struct Cache {
    pub(crate) users: Option<HashMap<i64, User>>,
    pub(crate) recent_orders: Option<Vec<Order>>,
}

/// Indexes users by id. A repeated id keeps the later record.
pub(crate) fn users_by_id(users: Vec<User>) -> HashMap<i64, User> {
    let mut by_id = HashMap::with_capacity(users.len());
    for user in users {
        let id = user.id;
        if by_id.insert(id, user).is_some() {
            tracing::warn!(user_id = id, "duplicate user id in remote result; keeping the later record");
        }
    }
    by_id
}
