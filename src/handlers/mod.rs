pub mod dashboards;
pub mod health;
pub mod leases;
pub mod owners;
pub mod properties;

use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{LeaseService, OwnerService, PropertyService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub owners: Arc<OwnerService>,
    pub properties: Arc<PropertyService>,
    pub leases: Arc<LeaseService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            owners: Arc::new(OwnerService::new(db_pool.clone(), event_sender.clone())),
            properties: Arc::new(PropertyService::new(db_pool.clone(), event_sender.clone())),
            leases: Arc::new(LeaseService::new(db_pool, event_sender)),
        }
    }
}

/// Free-text search shared by the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive search term
    pub q: Option<String>,
}
