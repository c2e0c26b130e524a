//! Products, categories and delivery methods.

use serde_json::Value;

use crate::error::ShopError;
use crate::session::{Args, Transport};
use crate::types::{Category, Delivery, Product};

use super::{args, ShopClient};

impl<T: Transport> ShopClient<T> {
    /// Fetches one product by id, with its image path when assets are configured.
    ///
    /// # Errors
    ///
    /// - [`ShopError::EmptyResult`] if no product came back.
    /// - Any error from [`Self::call`] or hydration.
    pub async fn get_product(&self, product_id: i64) -> Result<Product, ShopError> {
        self.fetch_one(
            "Product_GetProduct",
            args([("ProductId", Value::from(product_id))]),
        )
        .await
    }

    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn get_products(&self) -> Result<Vec<Product>, ShopError> {
        self.fetch_many("Product_GetProducts", Args::new()).await
    }

    /// Products whose searchable text contains `query`. Matching happens
    /// on the remote side.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ShopError> {
        self.fetch_many("Product_Search", args([("Search", Value::from(query))]))
            .await
    }

    /// Sets the status code of a product. `false` means the remote side refused.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn update_product_status(
        &self,
        product_id: i64,
        status: u32,
    ) -> Result<bool, ShopError> {
        self.call_bool(
            "Product_UpdateStatus",
            args([
                ("ProductId", Value::from(product_id)),
                ("Status", Value::from(status)),
            ]),
        )
        .await
    }

    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn delete_product(&self, product_id: i64) -> Result<bool, ShopError> {
        self.call_bool(
            "Product_Delete",
            args([("ProductId", Value::from(product_id))]),
        )
        .await
    }

    /// # Errors
    ///
    /// - [`ShopError::EmptyResult`] if no category came back.
    /// - Any error from [`Self::call`] or hydration.
    pub async fn get_category(&self, category_id: i64) -> Result<Category, ShopError> {
        self.fetch_one(
            "Category_GetCategory",
            args([("CategoryId", Value::from(category_id))]),
        )
        .await
    }

    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn get_categories(&self) -> Result<Vec<Category>, ShopError> {
        self.fetch_many("Category_GetCategories", Args::new()).await
    }

    /// # Errors
    ///
    /// Transport failures and non-boolean replies.
    pub async fn delete_category(&self, category_id: i64) -> Result<bool, ShopError> {
        self.call_bool(
            "Category_Delete",
            args([("CategoryId", Value::from(category_id))]),
        )
        .await
    }

    /// Delivery methods configured in the shop.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::call`] or hydration.
    pub async fn get_deliveries(&self) -> Result<Vec<Delivery>, ShopError> {
        self.fetch_many("Delivery_GetDeliveryMethods", Args::new())
            .await
    }
}
