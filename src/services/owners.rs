use crate::{
    auth::Actor,
    commands::{
        owners::{CreateOwnerCommand, DeleteOwnerCommand, OwnerInput, UpdateOwnerCommand},
        Command,
    },
    db::DbPool,
    entities::owner,
    errors::ServiceError,
    events::EventSender,
    queries::{self, LeaseListing, OwnerDashboard},
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service for managing owners
#[derive(Clone)]
pub struct OwnerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OwnerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_owner(
        &self,
        actor: Actor,
        input: OwnerInput,
    ) -> Result<owner::Model, ServiceError> {
        CreateOwnerCommand { actor, input }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, input))]
    pub async fn update_owner(
        &self,
        actor: Actor,
        owner_id: Uuid,
        input: OwnerInput,
    ) -> Result<owner::Model, ServiceError> {
        UpdateOwnerCommand {
            actor,
            owner_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_owner(&self, actor: Actor, owner_id: Uuid) -> Result<(), ServiceError> {
        DeleteOwnerCommand { actor, owner_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_owner(&self, owner_id: Uuid) -> Result<owner::Model, ServiceError> {
        owner::Entity::find_by_id(owner_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Owner {} not found", owner_id)))
    }

    #[instrument(skip(self))]
    pub async fn search_owners(&self, q: Option<&str>) -> Result<Vec<owner::Model>, ServiceError> {
        Ok(queries::search_owners(&*self.db_pool, q).await?)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, owner_id: Uuid) -> Result<OwnerDashboard, ServiceError> {
        queries::owner_dashboard(&*self.db_pool, owner_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Owner {} not found", owner_id)))
    }

    /// Lease requests received on the owner's properties.
    #[instrument(skip(self))]
    pub async fn lease_requests(&self, owner_id: Uuid) -> Result<Vec<LeaseListing>, ServiceError> {
        self.get_owner(owner_id).await?;
        Ok(queries::owner_lease_requests(&*self.db_pool, owner_id).await?)
    }
}
