use crate::{
    auth::Actor,
    commands::{
        leases::{DeleteLeaseCommand, LeaseInput, SubmitLeaseCommand, UpdateLeaseCommand},
        Command,
    },
    db::DbPool,
    entities::lease,
    errors::ServiceError,
    events::EventSender,
    queries::{self, LeaseListing, TenantDashboard},
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service for submitting and managing leases
#[derive(Clone)]
pub struct LeaseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LeaseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn submit_lease(
        &self,
        actor: Actor,
        input: LeaseInput,
    ) -> Result<lease::Model, ServiceError> {
        SubmitLeaseCommand { actor, input }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, input))]
    pub async fn update_lease(
        &self,
        actor: Actor,
        lease_id: Uuid,
        input: LeaseInput,
    ) -> Result<lease::Model, ServiceError> {
        UpdateLeaseCommand {
            actor,
            lease_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_lease(&self, actor: Actor, lease_id: Uuid) -> Result<(), ServiceError> {
        DeleteLeaseCommand { actor, lease_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_lease(&self, lease_id: Uuid) -> Result<lease::Model, ServiceError> {
        lease::Entity::find_by_id(lease_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lease {} not found", lease_id)))
    }

    #[instrument(skip(self))]
    pub async fn search_leases(&self, q: Option<&str>) -> Result<Vec<LeaseListing>, ServiceError> {
        Ok(queries::search_leases(&*self.db_pool, q).await?)
    }

    #[instrument(skip(self))]
    pub async fn tenant_dashboard(
        &self,
        tenant_email: Option<&str>,
    ) -> Result<TenantDashboard, ServiceError> {
        Ok(queries::tenant_dashboard(&*self.db_pool, tenant_email).await?)
    }
}
