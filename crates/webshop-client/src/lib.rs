//! Client for a webshop's procedure-call API.
//!
//! [`ShopClient`] owns one authenticated session. Every call goes through
//! [`normalize`], which turns the service's inconsistent response envelopes
//! into a [`Payload`]; entity methods then hydrate the records into typed
//! [`Order`], [`User`], [`Product`], [`Category`] and [`Delivery`] values.

mod cache;
pub mod client;
pub mod error;
pub mod hydrate;
pub mod normalize;
pub mod projection;
pub mod session;
pub mod types;
pub mod window;

#[cfg(test)]
mod testing;

pub use client::{RecentOrders, ShopClient};
pub use error::{RemoteFault, ShopError};
pub use hydrate::{hydrate, hydrate_all};
pub use normalize::{normalize, NormalizedResult, Payload, Record};
pub use projection::{canonical_field, field_declaration, EntityKind, FieldProjection};
pub use session::{Args, HttpSession, Transport};
pub use types::{AssetUrl, Category, Delivery, Entity, Order, Product, User};
pub use window::{plan_windows, plan_windows_through, status_filter, DateWindow};
