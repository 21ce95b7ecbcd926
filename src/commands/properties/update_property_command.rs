use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, find_property, Command},
    db::{DatabaseAccess, DbPool},
    entities::property,
    errors::ServiceError,
    events::{Event, EventSender},
    validation::FieldErrors,
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::PropertyInput;

/// Replaces a property's descriptive fields. `disponible` is left to the
/// availability reconciler.
#[derive(Debug, Clone)]
pub struct UpdatePropertyCommand {
    pub actor: Actor,
    pub property_id: Uuid,
    pub input: PropertyInput,
}

#[async_trait::async_trait]
impl Command for UpdatePropertyCommand {
    type Result = property::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(property_id = %self.property_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let actor = self.actor;
        let property_id = self.property_id;
        let input = self.input.clone().normalized();

        let saved = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let existing = find_property(txn, property_id, true).await?;
                    let current_owner = find_owner(txn, existing.owner_id).await?;
                    actor.ensure_can_manage(&current_owner)?;

                    FieldErrors::from_validation(&input).into_result()?;

                    let owner_id = match input.owner_id {
                        Some(new_owner_id) if new_owner_id != existing.owner_id => {
                            if !actor.is_staff() {
                                return Err(ServiceError::Forbidden(
                                    "Only staff may transfer a property to another owner"
                                        .to_string(),
                                ));
                            }
                            find_owner(txn, new_owner_id).await?.id
                        }
                        _ => existing.owner_id,
                    };

                    let mut active = existing.into_active_model();
                    active.owner_id = Set(owner_id);
                    active.title = Set(input.title);
                    active.address = Set(input.address);
                    active.city = Set(input.city);
                    active.surface_area_m2 = Set(input.surface_area_m2);
                    active.monthly_rent = Set(input.monthly_rent);
                    active.property_type = Set(input.property_type);
                    active.exige_validation_contrat = Set(input.exige_validation_contrat);

                    active.update(txn).await.map_err(|e| {
                        error!(error = %e, "Failed to update property");
                        ServiceError::db_error(e)
                    })
                })
            })
            .await?;

        info!(property_id = %saved.id, "Property updated");
        event_sender.publish(Event::PropertyUpdated(saved.id));

        Ok(saved)
    }
}
