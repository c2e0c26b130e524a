//! The webshop client: one session, its field projections and its caches.

mod catalog;
mod orders;
mod users;

use serde_json::Value;
use webshop_core::AppConfig;

use crate::cache::Cache;
use crate::error::ShopError;
use crate::hydrate::{hydrate, hydrate_all};
use crate::normalize::{normalize, NormalizedResult};
use crate::projection::{canonical_field, field_declaration, EntityKind, FieldProjection};
use crate::session::{Args, HttpSession, Transport};
use crate::types::{AssetUrl, Entity};

/// Trailing window and status allow-list behind [`ShopClient::get_orders`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentOrders {
    pub days: u32,
    pub statuses: Vec<u32>,
}

impl Default for RecentOrders {
    fn default() -> Self {
        Self {
            days: 1,
            statuses: vec![1, 2, 3, 4, 5, 6, 7],
        }
    }
}

/// Client for the webshop procedure-call API.
///
/// Owns its session, the field projections accepted in that session and the
/// user/order caches. Calls run one at a time; methods that touch projection
/// or cache state take `&mut self`, so a shared instance must be serialized
/// by whoever shares it.
pub struct ShopClient<T = HttpSession> {
    session: T,
    projection: FieldProjection,
    cache: Cache,
    assets: Option<AssetUrl>,
    recent: RecentOrders,
}

impl ShopClient<HttpSession> {
    /// Connects using the loaded application configuration.
    ///
    /// Image paths are derived only when a shop id is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Connection`] if the handshake fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, ShopError> {
        let session = HttpSession::connect(
            &config.api_url,
            &config.credentials,
            config.request_timeout_secs,
        )
        .await?;
        let assets = config
            .shop_id
            .map(|shop_id| AssetUrl::new(shop_id, &config.asset_host));
        Ok(Self::new(session)
            .with_assets(assets)
            .with_recent_orders(RecentOrders {
                days: config.recent_order_days,
                statuses: config.recent_order_statuses.clone(),
            }))
    }
}

impl<T: Transport> ShopClient<T> {
    /// Wraps an already connected session.
    #[must_use]
    pub fn new(session: T) -> Self {
        Self {
            session,
            projection: FieldProjection::default(),
            cache: Cache::default(),
            assets: None,
            recent: RecentOrders::default(),
        }
    }

    #[must_use]
    pub fn with_assets(mut self, assets: Option<AssetUrl>) -> Self {
        self.assets = assets;
        self
    }

    #[must_use]
    pub fn with_recent_orders(mut self, recent: RecentOrders) -> Self {
        self.recent = recent;
        self
    }

    #[must_use]
    pub fn session(&self) -> &T {
        &self.session
    }

    #[must_use]
    pub fn assets(&self) -> Option<&AssetUrl> {
        self.assets.as_ref()
    }

    /// Invokes `procedure` and normalizes its envelope.
    ///
    /// # Errors
    ///
    /// - [`ShopError::RemoteCall`] if the invocation fails.
    /// - [`ShopError::MalformedResponse`] if the envelope has no
    ///   `"<procedure>Result"`.
    pub async fn call(&self, procedure: &str, args: Args) -> Result<NormalizedResult, ShopError> {
        let envelope = self.session.invoke(procedure, args).await?;
        normalize(procedure, envelope)
    }

    /// Declares which fields the remote side returns for `kind` from now on.
    ///
    /// Names are canonicalized (first letter uppercased) and sent as one
    /// comma-separated `Fields` argument. A rejected list comes back as
    /// `Ok(false)`; callers that depend on the projection must check it.
    ///
    /// # Errors
    ///
    /// Transport failures and non-boolean replies are errors; a rejection is not.
    pub async fn set_fields<S: AsRef<str>>(
        &mut self,
        kind: EntityKind,
        fields: &[S],
    ) -> Result<bool, ShopError> {
        let procedure = kind.set_fields_procedure();
        let declaration = field_declaration(fields);
        tracing::debug!(entity = %kind, fields = %declaration, "applying field projection");

        let accepted = self
            .call_bool(&procedure, args([("Fields", Value::String(declaration))]))
            .await?;
        if accepted {
            let canonical = fields.iter().map(|f| canonical_field(f.as_ref())).collect();
            self.projection.record(kind, canonical);
        }
        Ok(accepted)
    }

    /// Fields last accepted for `kind` in this session.
    #[must_use]
    pub fn declared_fields(&self, kind: EntityKind) -> Option<&[String]> {
        self.projection.get(kind)
    }

    /// Sends the last accepted projection for `kind` again, for example after
    /// the remote side lost it. Returns `None` if nothing was declared yet.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_fields`].
    pub async fn reapply_fields(&mut self, kind: EntityKind) -> Result<Option<bool>, ShopError> {
        let Some(fields) = self.projection.get(kind).map(<[String]>::to_vec) else {
            return Ok(None);
        };
        self.set_fields(kind, &fields).await.map(Some)
    }

    /// Calls a procedure whose protocol answer is a success boolean.
    async fn call_bool(&self, procedure: &str, args: Args) -> Result<bool, ShopError> {
        let ok = self.call(procedure, args).await?.as_bool()?;
        if !ok {
            tracing::warn!(procedure, "remote side answered false");
        }
        Ok(ok)
    }

    async fn fetch_one<E: Entity>(&self, procedure: &str, args: Args) -> Result<E, ShopError> {
        let record = self.call(procedure, args).await?.into_record()?;
        hydrate(record, self.assets.as_ref())
    }

    async fn fetch_many<E: Entity>(
        &self,
        procedure: &str,
        args: Args,
    ) -> Result<Vec<E>, ShopError> {
        let records = self.call(procedure, args).await?.into_sequence()?;
        hydrate_all(records, self.assets.as_ref())
    }
}

/// Builds an argument mapping from `(name, value)` pairs.
fn args<const N: usize>(pairs: [(&str, Value); N]) -> Args {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
