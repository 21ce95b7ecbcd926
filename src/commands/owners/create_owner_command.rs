use crate::{
    auth::Actor,
    commands::{claim_write_lock, is_unique_violation, Command},
    db::{DatabaseAccess, DbPool},
    entities::owner,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_identity_free, identity_conflict, OwnerInput};

#[derive(Debug, Clone)]
pub struct CreateOwnerCommand {
    pub actor: Actor,
    pub input: OwnerInput,
}

#[async_trait::async_trait]
impl Command for CreateOwnerCommand {
    type Result = owner::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(actor = ?self.actor.user_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_staff()?;

        let input = self.input.clone().normalized();
        input.validate()?;

        let saved = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    if let Some(user_id) = input.user_id {
                        ensure_identity_free(txn, user_id, None).await?;
                    }

                    let new_owner = owner::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        user_id: Set(input.user_id),
                        full_name: Set(input.full_name),
                        email: Set(input.email),
                        telephone: Set(input.telephone),
                        ..Default::default()
                    };

                    new_owner.insert(txn).await.map_err(|e| {
                        if is_unique_violation(&e) {
                            identity_conflict(input.user_id)
                        } else {
                            error!(error = %e, "Failed to create owner");
                            ServiceError::db_error(e)
                        }
                    })
                })
            })
            .await?;

        info!(owner_id = %saved.id, "Owner created");
        event_sender.publish(Event::OwnerCreated(saved.id));

        Ok(saved)
    }
}
