//! Domain entities returned by the webshop API.
//!
//! Each entity types the identifier it is looked up by and keeps every other
//! remote field, known or not, in its `fields` bag under the remote name.
//! Image-bearing entities additionally carry a derived `FilePath`.
//!
//! Only users require an `Id`, since the user cache is keyed by it. Every
//! other entity takes whatever the active field projection returns, which
//! may leave the id out.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ShopError;
use crate::normalize::{classify, Payload, Record};

/// Remote key of the nested order-line collection on an order.
pub const ORDER_LINES_FIELD: &str = "Orderlines";

/// Base URL for uploaded shop images: `https://shop{id}.{host}/upload_dir/shop/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrl {
    prefix: String,
}

impl AssetUrl {
    #[must_use]
    pub fn new(shop_id: u64, asset_host: &str) -> Self {
        Self {
            prefix: format!(
                "https://shop{shop_id}.{}/upload_dir/shop/",
                asset_host.trim_matches('/')
            ),
        }
    }

    /// Uses `prefix` verbatim.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}{file_name}", self.prefix)
    }
}

/// A typed view over a normalized record.
pub trait Entity: serde::de::DeserializeOwned {
    /// Entity name used in error messages.
    const NAME: &'static str;

    /// `None` when the active projection left the id out.
    fn id(&self) -> Option<i64>;

    /// Fills derived fields once the remote fields are in place.
    fn attach_assets(&mut self, _assets: &AssetUrl) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "Id", deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: Record,
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        rename = "Id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_id"
    )]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: Record,
}

impl Order {
    /// Order lines nested under [`ORDER_LINES_FIELD`], classified with the same
    /// shape rules as top-level results. Absent lines yield an empty list;
    /// they only appear when the order projection includes them.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::MalformedResponse`] if the nested value is not a
    /// record or a collection of records.
    pub fn order_lines(&self) -> Result<Vec<Record>, ShopError> {
        let context = || match self.id {
            Some(id) => format!("order {id} {ORDER_LINES_FIELD}"),
            None => format!("order {ORDER_LINES_FIELD}"),
        };
        let Some(value) = self.fields.get(ORDER_LINES_FIELD) else {
            return Ok(Vec::new());
        };
        match classify(value.clone()) {
            Ok(Payload::Sequence(records)) => Ok(records),
            Ok(Payload::Record(record)) => Ok(vec![record]),
            Ok(Payload::Bool(_)) => Err(ShopError::MalformedResponse {
                procedure: context(),
                reason: "order lines are a boolean".to_owned(),
            }),
            Err(reason) => Err(ShopError::MalformedResponse {
                procedure: context(),
                reason,
            }),
        }
    }
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        rename = "Id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_id"
    )]
    pub id: Option<i64>,
    #[serde(rename = "FileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Public image URL derived from `FileName` at hydration.
    #[serde(rename = "FilePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(flatten)]
    pub fields: Record,
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn attach_assets(&mut self, assets: &AssetUrl) {
        self.file_path = image_path(self.file_name.as_deref(), assets);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(
        rename = "Id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_id"
    )]
    pub id: Option<i64>,
    #[serde(rename = "FileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "FilePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(flatten)]
    pub fields: Record,
}

impl Entity for Category {
    const NAME: &'static str = "Category";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn attach_assets(&mut self, assets: &AssetUrl) {
        self.file_path = image_path(self.file_name.as_deref(), assets);
    }
}

/// A delivery method offered by the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(
        rename = "Id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_id"
    )]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: Record,
}

impl Entity for Delivery {
    const NAME: &'static str = "Delivery";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

fn image_path(file_name: Option<&str>, assets: &AssetUrl) -> Option<String> {
    file_name
        .filter(|name| !name.is_empty())
        .map(|name| assets.url_for(name))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| E::custom(format!("invalid id \"{s}\": {e}"))),
        }
    }
}

/// Accepts identifiers sent either as JSON numbers or as numeric strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.into_id()
}

/// [`lenient_id`] for entities whose id may be projected away; `null` counts
/// as absent.
fn lenient_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_id)
        .transpose()
}
