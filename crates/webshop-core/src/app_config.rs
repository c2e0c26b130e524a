#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Username/password pair used for the connect-once handshake.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub credentials: Credentials,
    pub env: Environment,
    pub log_level: String,
    /// Numeric shop identifier embedded in image asset URLs. Without it no
    /// image paths are derived.
    pub shop_id: Option<u64>,
    pub asset_host: String,
    pub request_timeout_secs: u64,
    pub recent_order_days: u32,
    pub recent_order_statuses: Vec<u32>,
}
