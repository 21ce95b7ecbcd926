use crate::{
    auth::Actor,
    commands::{claim_write_lock, find_owner, find_property, Command},
    db::{DatabaseAccess, DbPool},
    entities::lease,
    errors::ServiceError,
    events::{Event, EventSender},
    notifications::LeaseNotice,
    services::availability::reconcile_availability,
    validation::{validate_lease, FieldErrors},
};
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{map_lease_write_error, LeaseInput};

/// Records a new lease and recomputes the property's availability.
///
/// The owner is notified once the lease is committed.
#[derive(Debug, Clone)]
pub struct SubmitLeaseCommand {
    pub actor: Actor,
    pub input: LeaseInput,
}

#[async_trait::async_trait]
impl Command for SubmitLeaseCommand {
    type Result = lease::Model;

    #[instrument(
        skip(self, db_pool, event_sender),
        fields(property_id = %self.input.property_id)
    )]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.actor.require_authenticated()?;

        let input = self.input.clone().normalized();
        let field_errors = FieldErrors::from_validation(&input);

        let (saved, notice, changes) = DatabaseAccess::new(db_pool)
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    let owner = find_owner(txn, input.owner_id).await?;
                    let property = find_property(txn, input.property_id, true).await?;

                    let mut errors =
                        validate_lease(txn, &input.candidate(None), &property, &owner).await?;
                    errors.merge(field_errors);
                    errors.into_result()?;

                    let new_lease = lease::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        property_id: Set(property.id),
                        tenant_name: Set(input.tenant_name),
                        tenant_phone: Set(input.tenant_phone),
                        tenant_email: Set(input.tenant_email),
                        tenant_notes: Set(input.tenant_notes),
                        start_date: Set(input.start_date),
                        end_date: Set(input.end_date),
                        deposit: Set(input.deposit),
                        active: Set(input.active),
                    };
                    let saved = new_lease.insert(txn).await.map_err(map_lease_write_error)?;

                    let changes = reconcile_availability(txn, property.id).await?;
                    let notice = LeaseNotice::new(&saved, &property, &owner);

                    Ok((saved, notice, changes))
                })
            })
            .await?;

        info!(
            lease_id = %saved.id,
            property_id = %saved.property_id,
            active = saved.active,
            "Lease created"
        );
        event_sender.publish(Event::LeaseCreated(notice));
        event_sender.publish_all(changes.into_iter().map(Event::from));

        Ok(saved)
    }
}
