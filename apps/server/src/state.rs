//! Shared application state: the database handle, the resolved tenant,
//! and the loaded configuration. Cheap to clone; axum clones it per
//! request.

use std::sync::Arc;

use vitrine_core::CompanyId;
use vitrine_db::Database;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Resolved once at startup from the configured slug and threaded
    /// explicitly into every repository call.
    pub company: CompanyId,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, company: CompanyId, config: ServerConfig) -> Self {
        AppState {
            db,
            company,
            config: Arc::new(config),
        }
    }
}
