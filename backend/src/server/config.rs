//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use rand::RngCore;
use rand::rngs::OsRng;
use storefront::outbound::persistence::DbPool;
use storefront::settings::{SettingsError, StorefrontSettings};
use tracing::warn;

/// Signing keys for bearer tokens and gateway notifications.
#[derive(Clone)]
pub struct Secrets {
    pub(crate) jwt: String,
    pub(crate) webhook: String,
}

impl Secrets {
    /// Resolve both secrets from settings.
    ///
    /// Missing secrets are generated when the settings allow it; tokens and
    /// signatures made with them do not survive a restart.
    pub fn from_settings(settings: &StorefrontSettings) -> Result<Self, SettingsError> {
        let allow = settings.ephemeral_secrets_allowed();
        Ok(Self {
            jwt: resolve("jwt_secret", settings.jwt_secret.as_deref(), allow)?,
            webhook: resolve("webhook_secret", settings.webhook_secret.as_deref(), allow)?,
        })
    }
}

fn resolve(
    name: &'static str,
    configured: Option<&str>,
    allow_ephemeral: bool,
) -> Result<String, SettingsError> {
    match configured.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.to_owned()),
        None if allow_ephemeral => {
            warn!(secret = name, "using a generated secret (dev only)");
            let mut bytes = [0_u8; 32];
            OsRng.fill_bytes(&mut bytes);
            Ok(hex::encode(bytes))
        }
        None => Err(SettingsError::MissingSecret { name }),
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) secrets: Secrets,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, secrets: Secrets) -> Self {
        Self {
            bind_addr,
            secrets,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one the server runs on the in-memory store seeded with the
    /// demo catalogue.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
