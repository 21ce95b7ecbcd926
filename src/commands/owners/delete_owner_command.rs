use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, Command},
    db::{DatabaseAccess, DbPool},
    entities::owner,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Deletes an owner; properties and their leases go with it.
#[derive(Debug, Clone)]
pub struct DeleteOwnerCommand {
    pub actor: Actor,
    pub owner_id: Uuid,
}

#[async_trait::async_trait]
impl Command for DeleteOwnerCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(owner_id = %self.owner_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_staff()?;
        let owner_id = self.owner_id;

        DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    find_owner(txn, owner_id).await?;
                    owner::Entity::delete_by_id(owner_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await?;

        info!(%owner_id, "Owner deleted");
        event_sender.publish(Event::OwnerDeleted(owner_id));

        Ok(())
    }
}
