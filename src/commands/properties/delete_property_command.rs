use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, find_property, Command},
    db::{DatabaseAccess, DbPool},
    entities::property,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Deletes a property together with its leases.
#[derive(Debug, Clone)]
pub struct DeletePropertyCommand {
    pub actor: Actor,
    pub property_id: Uuid,
}

#[async_trait::async_trait]
impl Command for DeletePropertyCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(property_id = %self.property_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let actor = self.actor;
        let property_id = self.property_id;

        DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let existing = find_property(txn, property_id, true).await?;
                    let owner = find_owner(txn, existing.owner_id).await?;
                    actor.ensure_can_manage(&owner)?;

                    property::Entity::delete_by_id(property_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await?;

        info!(%property_id, "Property deleted");
        event_sender.publish(Event::PropertyDeleted(property_id));

        Ok(())
    }
}
