//! Server configuration, loaded from environment variables with defaults
//! suited to a single-store development setup.

use std::env;

/// Runtime configuration for the Vitrine server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// Slug of the company this deployment serves. Resolved to a
    /// CompanyId once at startup.
    pub company_slug: String,

    /// Store display name, used on receipts and the catalog export.
    pub store_name: String,

    /// Configured delivery cost in centavos, split per delivery mode.
    pub delivery_cost_cents: i64,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("VITRINE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VITRINE_PORT".to_string()))?,

            database_path: env::var("VITRINE_DB_PATH")
                .unwrap_or_else(|_| "./vitrine.db".to_string()),

            company_slug: env::var("VITRINE_COMPANY_SLUG")
                .unwrap_or_else(|_| "loja-central".to_string()),

            store_name: env::var("VITRINE_STORE_NAME")
                .unwrap_or_else(|_| "Loja Central".to_string()),

            delivery_cost_cents: env::var("VITRINE_DELIVERY_COST_CENTS")
                .unwrap_or_else(|_| {
                    vitrine_core::DEFAULT_DELIVERY_COST_CENTS.to_string()
                })
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("VITRINE_DELIVERY_COST_CENTS".to_string())
                })?,
        };

        if config.company_slug.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "VITRINE_COMPANY_SLUG".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
