use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_lease, find_owner, find_property, Command},
    db::{DatabaseAccess, DbPool},
    entities::lease,
    errors::ServiceError,
    events::{Event, EventSender},
    services::availability::reconcile_availability,
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DeleteLeaseCommand {
    pub actor: Actor,
    pub lease_id: Uuid,
}

#[async_trait::async_trait]
impl Command for DeleteLeaseCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(lease_id = %self.lease_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let actor = self.actor;
        let lease_id = self.lease_id;

        let (property_id, change) = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let existing = find_lease(txn, lease_id).await?;
                    let property = find_property(txn, existing.property_id, true).await?;
                    let owner = find_owner(txn, property.owner_id).await?;
                    actor.ensure_can_manage(&owner)?;

                    lease::Entity::delete_by_id(lease_id).exec(txn).await?;
                    let change = reconcile_availability(txn, property.id).await?;

                    Ok((property.id, change))
                })
            })
            .await?;

        info!(%lease_id, %property_id, "Lease deleted");
        event_sender.publish(Event::LeaseDeleted(lease_id));
        event_sender.publish_all(change.into_iter().map(Event::from));

        Ok(())
    }
}
