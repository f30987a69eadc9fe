use std::net::SocketAddr;

use crate::ConfigError;

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

/// Which destination store implementation receives the synced menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Direct Postgres connection through `DATABASE_URL`.
    Postgres,
    /// Supabase PostgREST endpoint through `SUPABASE_URL` + `SUPABASE_SERVICE_KEY`.
    Rest,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Postgres => write!(f, "postgres"),
            StoreBackend::Rest => write!(f, "rest"),
        }
    }
}

/// The three values a sync run needs before it may touch the network.
#[derive(Clone)]
pub struct SyncTarget {
    pub api_key: String,
    pub organization_id: String,
    pub menu_name: String,
}

impl std::fmt::Debug for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTarget")
            .field("api_key", &"[redacted]")
            .field("organization_id", &self.organization_id)
            .field("menu_name", &self.menu_name)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub iiko_base_url: String,
    pub iiko_api_key: Option<String>,
    pub iiko_organization_id: Option<String>,
    pub iiko_menu_name: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub webhook_token: Option<String>,
}

impl AppConfig {
    /// Validates and returns the credential, organization and menu name a
    /// sync run needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `IIKO_API_KEY` or
    /// `IIKO_ORGANIZATION_ID` is absent or blank, or when the menu name is blank.
    pub fn sync_target(&self) -> Result<SyncTarget, ConfigError> {
        let api_key = non_blank(self.iiko_api_key.as_deref(), "IIKO_API_KEY")?;
        let organization_id =
            non_blank(self.iiko_organization_id.as_deref(), "IIKO_ORGANIZATION_ID")?;
        let menu_name = non_blank(Some(&self.iiko_menu_name), "IIKO_MENU_NAME")?;

        Ok(SyncTarget {
            api_key,
            organization_id,
            menu_name,
        })
    }

    /// Returns the upstream API credential alone, for commands that only
    /// need to authenticate (e.g. listing organizations).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `IIKO_API_KEY` is absent or blank.
    pub fn iiko_api_key(&self) -> Result<String, ConfigError> {
        non_blank(self.iiko_api_key.as_deref(), "IIKO_API_KEY")
    }
}

fn non_blank(value: Option<&str>, var: &str) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ConfigError::MissingEnvVar(var.to_owned())),
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("iiko_base_url", &self.iiko_base_url)
            .field(
                "iiko_api_key",
                &self.iiko_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("iiko_organization_id", &self.iiko_organization_id)
            .field("iiko_menu_name", &self.iiko_menu_name)
            .field("store_backend", &self.store_backend)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_key",
                &self.supabase_service_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field(
                "webhook_token",
                &self.webhook_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
