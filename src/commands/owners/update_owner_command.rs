use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, is_unique_violation, Command},
    db::{DatabaseAccess, DbPool},
    entities::owner,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_identity_free, identity_conflict, OwnerInput};

/// Replaces an owner's fields. Staff or the owner themself.
#[derive(Debug, Clone)]
pub struct UpdateOwnerCommand {
    pub actor: Actor,
    pub owner_id: Uuid,
    pub input: OwnerInput,
}

#[async_trait::async_trait]
impl Command for UpdateOwnerCommand {
    type Result = owner::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(owner_id = %self.owner_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let actor = self.actor;
        let owner_id = self.owner_id;
        let input = self.input.clone().normalized();

        let saved = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let existing = find_owner(txn, owner_id).await?;
                    actor.ensure_can_manage(&existing)?;

                    if input.user_id != existing.user_id {
                        if !actor.is_staff() {
                            return Err(ServiceError::Forbidden(
                                "Only staff may change an owner's identity link".to_string(),
                            ));
                        }
                        if let Some(user_id) = input.user_id {
                            ensure_identity_free(txn, user_id, Some(owner_id)).await?;
                        }
                    }

                    input.validate()?;

                    let mut active = existing.into_active_model();
                    active.user_id = Set(input.user_id);
                    active.full_name = Set(input.full_name);
                    active.email = Set(input.email);
                    active.telephone = Set(input.telephone);

                    active.update(txn).await.map_err(|e| {
                        if is_unique_violation(&e) {
                            identity_conflict(input.user_id)
                        } else {
                            error!(error = %e, "Failed to update owner");
                            ServiceError::db_error(e)
                        }
                    })
                })
            })
            .await?;

        info!(owner_id = %saved.id, "Owner updated");
        event_sender.publish(Event::OwnerUpdated(saved.id));

        Ok(saved)
    }
}
