use std::collections::HashMap;

use serde_json::Value;

use crate::cache::users_by_id;
use crate::error::ShopError;
use crate::session::{Args, Transport};
use crate::types::User;

use super::{args, ShopClient};

impl<T: Transport> ShopClient<T> {
    /// Fetches one user by id.
    ///
    /// # Errors
    ///
    /// - [`ShopError::EmptyResult`] if no user came back.
    /// - Any error from [`Self::call`] or hydration.
    pub async fn get_user(&self, user_id: i64) -> Result<User, ShopError> {
        self.fetch_one("User_GetUser", args([("UserId", Value::from(user_id))]))
            .await
    }

    /// All users keyed by id.
    ///
    /// With `use_cache`, a previous full fetch is returned as is. Otherwise
    /// the users are fetched again and the cache is rebuilt.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration. The cache is left
    /// untouched on failure.
    pub async fn get_users(&mut self, use_cache: bool) -> Result<&HashMap<i64, User>, ShopError> {
        if use_cache && self.cache.users.is_some() {
            tracing::debug!("users served from cache");
        } else {
            let users: Vec<User> = self.fetch_many("User_GetUsers", Args::new()).await?;
            tracing::debug!(users = users.len(), "users cache rebuilt");
            self.cache.users = Some(users_by_id(users));
        }
        Ok(self.cache.users.get_or_insert_with(HashMap::new))
    }

    /// Deletes a user. `false` means the remote side refused.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn delete_user(&self, user_id: i64) -> Result<bool, ShopError> {
        self.call_bool("User_Delete", args([("UserId", Value::from(user_id))]))
            .await
    }
}
