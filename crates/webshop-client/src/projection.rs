//! Field projection: which fields the remote service populates per entity type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Entity types that accept a field projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Order,
    OrderLine,
    Product,
    Category,
    Delivery,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Order => "Order",
            EntityKind::OrderLine => "OrderLine",
            EntityKind::Product => "Product",
            EntityKind::Category => "Category",
            EntityKind::Delivery => "Delivery",
        }
    }

    /// Name of the procedure that applies a projection for this entity type.
    ///
    /// Order lines are configured through the order namespace.
    #[must_use]
    pub fn set_fields_procedure(self) -> String {
        match self {
            EntityKind::OrderLine => "Order_SetOrderLineFields".to_owned(),
            kind => format!("{}_SetFields", kind.as_str()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(EntityKind::User),
            "order" => Ok(EntityKind::Order),
            "orderline" => Ok(EntityKind::OrderLine),
            "product" => Ok(EntityKind::Product),
            "category" => Ok(EntityKind::Category),
            "delivery" => Ok(EntityKind::Delivery),
            other => Err(format!("unknown entity type \"{other}\"")),
        }
    }
}

/// Uppercases the first character of `name` and leaves the rest untouched.
#[must_use]
pub fn canonical_field(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the comma-separated declaration sent as the `Fields` argument.
#[must_use]
pub fn field_declaration<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| canonical_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// The projection most recently accepted by the remote side, per entity type.
///
/// Nothing here re-applies a projection on its own: callers that reconnect
/// or need a different shape call `set_fields` again.
#[derive(Debug, Default, Clone)]
pub struct FieldProjection {
    accepted: HashMap<EntityKind, Vec<String>>,
}

impl FieldProjection {
    pub(crate) fn record(&mut self, kind: EntityKind, fields: Vec<String>) {
        self.accepted.insert(kind, fields);
    }

    /// Canonical field names last accepted for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> Option<&[String]> {
        self.accepted.get(&kind).map(Vec::as_slice)
    }
}
