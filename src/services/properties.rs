use crate::{
    auth::Actor,
    commands::{
        find_lease,
        properties::{
            CreatePropertyCommand, DeletePropertyCommand, PropertyInput, UpdatePropertyCommand,
        },
        Command,
    },
    db::{DatabaseAccess, DbPool},
    entities::property,
    errors::ServiceError,
    events::EventSender,
    queries,
    services::availability::{self, AvailabilityChange},
    validation,
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service for managing property listings
#[derive(Clone)]
pub struct PropertyService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PropertyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_property(
        &self,
        actor: Actor,
        input: PropertyInput,
    ) -> Result<property::Model, ServiceError> {
        CreatePropertyCommand { actor, input }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, input))]
    pub async fn update_property(
        &self,
        actor: Actor,
        property_id: Uuid,
        input: PropertyInput,
    ) -> Result<property::Model, ServiceError> {
        UpdatePropertyCommand {
            actor,
            property_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_property(
        &self,
        actor: Actor,
        property_id: Uuid,
    ) -> Result<(), ServiceError> {
        DeletePropertyCommand { actor, property_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_property(&self, property_id: Uuid) -> Result<property::Model, ServiceError> {
        property::Entity::find_by_id(property_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Property {} not found", property_id)))
    }

    #[instrument(skip(self))]
    pub async fn search_properties(
        &self,
        q: Option<&str>,
    ) -> Result<Vec<property::Model>, ServiceError> {
        Ok(queries::search_properties(&*self.db_pool, q).await?)
    }

    /// Properties a lease form may offer for the given owner and edited lease.
    #[instrument(skip(self))]
    pub async fn selectable_properties(
        &self,
        owner_id: Option<Uuid>,
        lease_id: Option<Uuid>,
    ) -> Result<Vec<property::Model>, ServiceError> {
        let db = &*self.db_pool;
        let editing = match lease_id {
            Some(id) => Some(find_lease(db, id).await?),
            None => None,
        };
        Ok(validation::selectable_properties(db, owner_id, editing.as_ref()).await?)
    }

    /// Re-derives availability for every property. Staff only.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self, actor: Actor) -> Result<Vec<AvailabilityChange>, ServiceError> {
        actor.require_staff()?;
        let changes =
            availability::reconcile_all(&DatabaseAccess::new(self.db_pool.clone())).await?;
        self.event_sender
            .publish_all(changes.iter().copied().map(crate::events::Event::from));
        Ok(changes)
    }
}
