//! Conversion of normalized records into typed entities.

use serde_json::Value;

use crate::error::ShopError;
use crate::normalize::Record;
use crate::types::{AssetUrl, Entity};

/// Copies every field of `record` onto a `T`.
///
/// Fields `T` does not name stay in its extra-fields bag. When `assets` is
/// given, derived image paths are computed here and only here.
///
/// # Errors
///
/// Returns [`ShopError::Hydrate`] if a typed field is missing or has an
/// unusable value (for example a non-numeric `Id`).
pub fn hydrate<T: Entity>(record: Record, assets: Option<&AssetUrl>) -> Result<T, ShopError> {
    let mut entity: T =
        serde_json::from_value(Value::Object(record)).map_err(|source| ShopError::Hydrate {
            entity: T::NAME,
            source,
        })?;
    if let Some(assets) = assets {
        entity.attach_assets(assets);
    }
    Ok(entity)
}

/// Hydrates every record, preserving order. Stops at the first failure.
///
/// # Errors
///
/// Propagates the first [`ShopError::Hydrate`].
pub fn hydrate_all<T: Entity>(
    records: Vec<Record>,
    assets: Option<&AssetUrl>,
) -> Result<Vec<T>, ShopError> {
    records
        .into_iter()
        .map(|record| hydrate(record, assets))
        .collect()
}
