use crate::app_config::{AppConfig, Environment, StoreBackend};
use crate::ConfigError;

pub const DEFAULT_IIKO_BASE_URL: &str = "https://api-ru.iiko.services";
pub const DEFAULT_MENU_NAME: &str = "Steppe App Menu";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are kept optional here: which of them are required depends on
/// the command being run, so [`AppConfig::sync_target`] and the store
/// constructors enforce presence at the point of use.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("STEPPE_ENV", "development"))?;
    let store_backend = parse_store_backend(&or_default("STEPPE_STORE_BACKEND", "postgres"))?;

    let bind_raw = or_default("STEPPE_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "STEPPE_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let iiko_base_url = or_default("IIKO_API_BASE_URL", DEFAULT_IIKO_BASE_URL);
    if !(iiko_base_url.starts_with("http://") || iiko_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "IIKO_API_BASE_URL".to_string(),
            reason: format!("'{iiko_base_url}' is not an http(s) URL"),
        });
    }

    let db_max_connections = parse_u32("STEPPE_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("STEPPE_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "STEPPE_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    let http_timeout_secs = parse_u64("STEPPE_HTTP_TIMEOUT_SECS", "30")?;
    if http_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STEPPE_HTTP_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level: or_default("STEPPE_LOG_LEVEL", "info"),
        iiko_base_url,
        iiko_api_key: optional("IIKO_API_KEY"),
        iiko_organization_id: optional("IIKO_ORGANIZATION_ID"),
        iiko_menu_name: or_default("IIKO_MENU_NAME", DEFAULT_MENU_NAME),
        store_backend,
        database_url: optional("DATABASE_URL"),
        supabase_url: optional("SUPABASE_URL"),
        supabase_service_key: optional("SUPABASE_SERVICE_KEY"),
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs: parse_u64("STEPPE_DB_ACQUIRE_TIMEOUT_SECS", "10")?,
        http_timeout_secs,
        http_user_agent: or_default("STEPPE_HTTP_USER_AGENT", "steppe-menu-sync/0.1"),
        webhook_token: optional("STEPPE_WEBHOOK_TOKEN"),
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STEPPE_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_store_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    match s {
        "postgres" => Ok(StoreBackend::Postgres),
        "rest" | "supabase" => Ok(StoreBackend::Rest),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STEPPE_STORE_BACKEND".to_string(),
            reason: format!("expected postgres or rest; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
