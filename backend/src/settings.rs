//! Storefront settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `STOREFRONT_*` environment variables over an
//! optional configuration file.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("bind address {value:?} is not a socket address")]
    InvalidBindAddr {
        /// Raw setting.
        value: String,
    },
    /// A secret is missing and ephemeral secrets are not allowed.
    #[error("{name} must be configured (or set STOREFRONT_ALLOW_EPHEMERAL_SECRETS)")]
    MissingSecret {
        /// Setting name.
        name: &'static str,
    },
}

/// Runtime configuration for the storefront server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct StorefrontSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Pool size; defaults to 10.
    pub db_max_connections: Option<u32>,
    /// HS256 key for bearer tokens.
    pub jwt_secret: Option<String>,
    /// HMAC key for gateway notifications.
    pub webhook_secret: Option<String>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Generate missing secrets instead of refusing to start.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secrets: bool,
}

impl StorefrontSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] for unparsable values.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Whether a missing secret may be replaced by a generated one.
    ///
    /// Debug builds always allow it.
    pub fn ephemeral_secrets_allowed(&self) -> bool {
        cfg!(debug_assertions) || self.allow_ephemeral_secrets
    }
}
