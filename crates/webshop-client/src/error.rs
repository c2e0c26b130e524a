use thiserror::Error;

/// Errors returned by the webshop client.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The login handshake was rejected or the endpoint could not be reached.
    #[error("could not connect to {endpoint}: {cause}")]
    Connection {
        endpoint: String,
        #[source]
        cause: RemoteFault,
    },

    /// A single remote invocation failed at the transport or on the remote side.
    #[error("remote call {procedure} failed: {cause}")]
    RemoteCall {
        procedure: String,
        #[source]
        cause: RemoteFault,
    },

    /// A singular record was requested but the call returned an empty collection.
    #[error("{procedure} returned no records")]
    EmptyResult { procedure: String },

    /// The envelope does not have the shape the protocol promises.
    #[error("malformed response from {procedure}: {reason}")]
    MalformedResponse { procedure: String, reason: String },

    /// The payload was classified as a different kind than the caller asked for.
    #[error("{procedure} returned a {actual}, expected a {expected}")]
    TypeMismatch {
        procedure: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A normalized record could not be converted into a typed entity.
    #[error("could not hydrate {entity}: {source}")]
    Hydrate {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Underlying cause of a [`ShopError::Connection`] or [`ShopError::RemoteCall`].
#[derive(Debug, Error)]
pub enum RemoteFault {
    /// Network, TLS or timeout failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The remote service reported a fault for this call.
    #[error("remote fault: {0}")]
    Fault(String),

    /// The response body is not valid JSON.
    #[error("invalid response body: {0}")]
    Body(#[source] serde_json::Error),

    /// The configured API URL cannot be used as a request base.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// The login handshake completed but no session token was granted.
    #[error("login rejected: {0}")]
    Rejected(String),
}
