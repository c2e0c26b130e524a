//! Session handshake and procedure invocation over HTTP.
//!
//! Every procedure is a `POST {api_url}/{procedure}` carrying the session
//! token and the argument mapping as JSON. The raw envelope is returned
//! untouched; shape interpretation belongs to [`crate::normalize`].

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::{json, Value};
use webshop_core::Credentials;

use crate::error::{RemoteFault, ShopError};

/// Argument mapping passed to a remote procedure.
pub type Args = serde_json::Map<String, Value>;

const LOGIN_PROCEDURE: &str = "Login";

/// The single capability the client needs from a connected session.
///
/// [`HttpSession`] is the production implementation. Anything that can turn
/// `(procedure, args)` into a raw envelope can stand in for it.
pub trait Transport {
    /// Invokes `procedure` with `args` and returns the raw response envelope.
    ///
    /// # Errors
    ///
    /// Implementations return [`ShopError::RemoteCall`] carrying `procedure`
    /// on any transport failure or remote-side fault.
    fn invoke(
        &self,
        procedure: &str,
        args: Args,
    ) -> impl Future<Output = Result<Value, ShopError>> + Send;
}

/// An authenticated connection to the webshop API.
pub struct HttpSession {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpSession {
    /// Performs the login handshake and returns a session bound to the
    /// granted token.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Connection`] if `api_url` is unusable, the
    /// endpoint is unreachable, or the handshake does not grant a token.
    pub async fn connect(
        api_url: &str,
        credentials: &Credentials,
        timeout_secs: u64,
    ) -> Result<Self, ShopError> {
        let connection_error = |cause: RemoteFault| ShopError::Connection {
            endpoint: api_url.to_owned(),
            cause,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("webshop-client/0.1")
            .build()
            .map_err(|e| connection_error(RemoteFault::Http(e)))?;

        // Exactly one trailing slash, so joining a procedure name appends a
        // path segment instead of replacing the last one.
        let normalised = format!("{}/", api_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| connection_error(RemoteFault::InvalidUrl(format!("{api_url}: {e}"))))?;

        let login_url = procedure_url(&base_url, LOGIN_PROCEDURE).map_err(connection_error)?;
        let body = json!({
            "Username": credentials.username,
            "Password": credentials.password,
        });
        let envelope = post_json(&client, login_url, &body)
            .await
            .map_err(connection_error)?;

        let token = envelope
            .get(format!("{LOGIN_PROCEDURE}Result"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                connection_error(RemoteFault::Rejected(
                    "no session token granted".to_owned(),
                ))
            })?
            .to_owned();

        tracing::info!(endpoint = %base_url, "webshop session established");

        Ok(Self {
            client,
            base_url,
            token,
        })
    }
}

impl Transport for HttpSession {
    async fn invoke(&self, procedure: &str, args: Args) -> Result<Value, ShopError> {
        let remote_error = |cause: RemoteFault| ShopError::RemoteCall {
            procedure: procedure.to_owned(),
            cause,
        };

        let url = procedure_url(&self.base_url, procedure).map_err(remote_error)?;
        let body = json!({
            "Session": self.token,
            "Arguments": Value::Object(args),
        });

        tracing::debug!(procedure, "invoking remote procedure");
        post_json(&self.client, url, &body)
            .await
            .map_err(remote_error)
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

fn procedure_url(base_url: &Url, procedure: &str) -> Result<Url, RemoteFault> {
    base_url
        .join(procedure)
        .map_err(|e| RemoteFault::InvalidUrl(format!("{base_url}{procedure}: {e}")))
}

/// Posts `body`, asserts a 2xx status, parses the reply as JSON and surfaces
/// a top-level `"Fault"` as [`RemoteFault::Fault`].
async fn post_json(client: &Client, url: Url, body: &Value) -> Result<Value, RemoteFault> {
    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteFault::Status {
            status: status.as_u16(),
        });
    }
    let text = response.text().await?;
    let envelope: Value = serde_json::from_str(&text).map_err(RemoteFault::Body)?;
    check_fault(&envelope)?;
    Ok(envelope)
}

fn check_fault(envelope: &Value) -> Result<(), RemoteFault> {
    let Some(fault) = envelope.get("Fault") else {
        return Ok(());
    };
    let message = match fault {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("Message")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| fault.to_string(), str::to_owned),
        other => other.to_string(),
    };
    Err(RemoteFault::Fault(message))
}
