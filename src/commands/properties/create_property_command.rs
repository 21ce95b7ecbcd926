use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, Command},
    db::{DatabaseAccess, DbPool},
    entities::{owner, property},
    errors::ServiceError,
    events::{Event, EventSender},
    validation::FieldErrors,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::PropertyInput;

/// Lists a new property. New listings start out available.
#[derive(Debug, Clone)]
pub struct CreatePropertyCommand {
    pub actor: Actor,
    pub input: PropertyInput,
}

#[async_trait::async_trait]
impl Command for CreatePropertyCommand {
    type Result = property::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(actor = ?self.actor.user_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let user_id = self.actor.require_authenticated()?;
        let actor = self.actor;

        let input = self.input.clone().normalized();
        let mut errors = FieldErrors::from_validation(&input);
        if actor.is_staff() && input.owner_id.is_none() {
            errors.add("owner_id", "This field is required.");
        }
        errors.into_result()?;

        let saved = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let owner = match (actor.is_staff(), input.owner_id) {
                        (true, Some(owner_id)) => find_owner(txn, owner_id).await?,
                        _ => {
                            let linked = owner::Entity::find()
                                .filter(owner::Column::UserId.eq(user_id))
                                .one(txn)
                                .await?
                                .ok_or_else(|| {
                                    ServiceError::Forbidden(
                                        "Only staff or registered owners may list properties"
                                            .to_string(),
                                    )
                                })?;
                            if input.owner_id.is_some_and(|id| id != linked.id) {
                                return Err(ServiceError::Forbidden(
                                    "You may only list properties under your own owner record"
                                        .to_string(),
                                ));
                            }
                            linked
                        }
                    };

                    let new_property = property::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        owner_id: Set(owner.id),
                        title: Set(input.title),
                        address: Set(input.address),
                        city: Set(input.city),
                        surface_area_m2: Set(input.surface_area_m2),
                        monthly_rent: Set(input.monthly_rent),
                        property_type: Set(input.property_type),
                        exige_validation_contrat: Set(input.exige_validation_contrat),
                        ..Default::default()
                    };

                    new_property.insert(txn).await.map_err(|e| {
                        error!(error = %e, owner_id = %owner.id, "Failed to create property");
                        ServiceError::db_error(e)
                    })
                })
            })
            .await?;

        info!(property_id = %saved.id, owner_id = %saved.owner_id, "Property created");
        event_sender.publish(Event::PropertyCreated(saved.id));

        Ok(saved)
    }
}
