use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_lease, find_owner, find_property, Command},
    db::{DatabaseAccess, DbPool},
    entities::lease,
    errors::ServiceError,
    events::{Event, EventSender},
    services::availability::reconcile_each,
    validation::{validate_lease, FieldErrors},
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{map_lease_write_error, LeaseInput};

/// Edits a lease, possibly moving it to another property.
///
/// Both the previous and the new property are reconciled.
#[derive(Debug, Clone)]
pub struct UpdateLeaseCommand {
    pub actor: Actor,
    pub lease_id: Uuid,
    pub input: LeaseInput,
}

#[async_trait::async_trait]
impl Command for UpdateLeaseCommand {
    type Result = lease::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(lease_id = %self.lease_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let actor = self.actor;
        let lease_id = self.lease_id;
        let input = self.input.clone().normalized();
        let field_errors = FieldErrors::from_validation(&input);

        let (saved, previous_property_id, changes) = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let existing = find_lease(txn, lease_id).await?;
                    let previous_property_id = existing.property_id;

                    // Lock in id order so concurrent reassignments cannot deadlock.
                    let mut lock_order = vec![previous_property_id, input.property_id];
                    lock_order.sort();
                    lock_order.dedup();
                    let mut locked = Vec::with_capacity(lock_order.len());
                    for id in lock_order {
                        locked.push(find_property(txn, id, true).await?);
                    }
                    let (previous, target) = {
                        let find = |id: Uuid| locked.iter().find(|p| p.id == id).cloned();
                        (find(previous_property_id), find(input.property_id))
                    };
                    let (previous, target) = match (previous, target) {
                        (Some(previous), Some(target)) => (previous, target),
                        _ => {
                            return Err(ServiceError::InternalError(
                                "Locked property set is incomplete".to_string(),
                            ))
                        }
                    };

                    let previous_owner = find_owner(txn, previous.owner_id).await?;
                    actor.ensure_can_manage(&previous_owner)?;
                    if target.owner_id != previous.owner_id {
                        actor.ensure_can_manage(&find_owner(txn, target.owner_id).await?)?;
                    }

                    let asserted_owner = find_owner(txn, input.owner_id).await?;
                    let mut errors = validate_lease(
                        txn,
                        &input.candidate(Some(lease_id)),
                        &target,
                        &asserted_owner,
                    )
                    .await?;
                    errors.merge(field_errors);
                    errors.into_result()?;

                    let mut active = existing.into_active_model();
                    active.property_id = Set(target.id);
                    active.tenant_name = Set(input.tenant_name);
                    active.tenant_phone = Set(input.tenant_phone);
                    active.tenant_email = Set(input.tenant_email);
                    active.tenant_notes = Set(input.tenant_notes);
                    active.start_date = Set(input.start_date);
                    active.end_date = Set(input.end_date);
                    active.deposit = Set(input.deposit);
                    active.active = Set(input.active);
                    let saved = active.update(txn).await.map_err(map_lease_write_error)?;

                    let changes = reconcile_each(txn, &[previous.id, target.id]).await?;

                    Ok((saved, previous_property_id, changes))
                })
            })
            .await?;

        info!(
            lease_id = %saved.id,
            property_id = %saved.property_id,
            previous_property_id = %previous_property_id,
            active = saved.active,
            "Lease updated"
        );
        event_sender.publish(Event::LeaseUpdated(saved.id));
        event_sender.publish_all(changes.into_iter().map(Event::from));

        Ok(saved)
    }
}
