use std::env;

use crate::licensing::TokenPolicy;

const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 60;
const DEFAULT_TOKEN_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Root directory of the filesystem blob store holding release archives
    pub artifact_dir: String,
    /// Absolute origin used when building download links
    pub base_url: String,
    pub dev_mode: bool,
    pub update_token_ttl_secs: i64,
    /// When true, a download token is consumed by its first successful redemption
    pub update_token_single_use: bool,
    /// Expired tokens older than this are purged at startup (0 = never purge)
    pub update_token_retention_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let dev_mode = var("GATEPOST_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000);

        let base_url = var("BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}:{}", host, port));

        let update_token_ttl_secs = var("UPDATE_TOKEN_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &i64| *secs > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let update_token_single_use = var("UPDATE_TOKEN_SINGLE_USE")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);

        let update_token_retention_days = var("UPDATE_TOKEN_RETENTION_DAYS")
            .and_then(|v| v.parse().ok())
            .filter(|days: &i64| *days >= 0)
            .unwrap_or(DEFAULT_TOKEN_RETENTION_DAYS);

        Self {
            host,
            port,
            database_path: var("DATABASE_PATH").unwrap_or_else(|| "gatepost.db".to_string()),
            artifact_dir: var("ARTIFACT_DIR").unwrap_or_else(|| "artifacts".to_string()),
            base_url,
            dev_mode,
            update_token_ttl_secs,
            update_token_single_use,
            update_token_retention_days,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            ttl_secs: self.update_token_ttl_secs,
            single_use: self.update_token_single_use,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
