use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::commands::{claim_write_lock, find_property};
use crate::db::DatabaseAccess;
use crate::entities::{lease, property};
use crate::errors::ServiceError;
use crate::events::Event;

/// Occupancy state of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    Available,
    Occupied,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

impl From<bool> for Availability {
    fn from(disponible: bool) -> Self {
        if disponible {
            Availability::Available
        } else {
            Availability::Occupied
        }
    }
}

/// A property is available exactly when none of its leases is active.
pub fn availability_from_leases<'a, I>(leases: I) -> Availability
where
    I: IntoIterator<Item = &'a lease::Model>,
{
    if leases.into_iter().any(|lease| lease.active) {
        Availability::Occupied
    } else {
        Availability::Available
    }
}

/// A persisted change of a property's availability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AvailabilityChange {
    pub property_id: Uuid,
    pub availability: Availability,
}

impl From<AvailabilityChange> for Event {
    fn from(change: AvailabilityChange) -> Self {
        Event::AvailabilityChanged {
            property_id: change.property_id,
            disponible: change.availability.is_available(),
        }
    }
}

/// Recomputes and stores `disponible` for one property.
///
/// Returns the change when the stored flag was different, `None` when it
/// already matched. Run it on the write transaction.
#[instrument(skip(db))]
pub async fn reconcile_availability<C: ConnectionTrait>(
    db: &C,
    property_id: Uuid,
) -> Result<Option<AvailabilityChange>, DbErr> {
    let property = property::Entity::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Property {} not found", property_id)))?;

    let leases = lease::Entity::find()
        .filter(lease::Column::PropertyId.eq(property_id))
        .all(db)
        .await?;

    let availability = availability_from_leases(&leases);
    if property.disponible == availability.is_available() {
        debug!(%property_id, %availability, "Availability unchanged");
        return Ok(None);
    }

    property::Entity::update_many()
        .col_expr(
            property::Column::Disponible,
            Expr::value(availability.is_available()),
        )
        .filter(property::Column::Id.eq(property_id))
        .exec(db)
        .await?;

    info!(%property_id, %availability, "Availability updated");
    Ok(Some(AvailabilityChange {
        property_id,
        availability,
    }))
}

/// Reconciles each id once, in the given order, skipping repeats.
pub async fn reconcile_each<C: ConnectionTrait>(
    db: &C,
    property_ids: &[Uuid],
) -> Result<Vec<AvailabilityChange>, DbErr> {
    let mut seen = Vec::with_capacity(property_ids.len());
    let mut changes = Vec::new();
    for id in property_ids {
        if seen.contains(id) {
            continue;
        }
        seen.push(*id);
        if let Some(change) = reconcile_availability(db, *id).await? {
            changes.push(change);
        }
    }
    Ok(changes)
}

/// Re-derives the flag for every property.
///
/// Each property is reconciled in its own transaction with the row locked, so
/// a lease write committed mid-sweep is never overwritten with a stale flag.
#[instrument(skip(access))]
pub async fn reconcile_all(
    access: &DatabaseAccess,
) -> Result<Vec<AvailabilityChange>, ServiceError> {
    let ids: Vec<Uuid> = property::Entity::find()
        .select_only()
        .column(property::Column::Id)
        .order_by_asc(property::Column::CreatedAt)
        .into_tuple()
        .all(access.get_pool())
        .await?;

    let mut changes = Vec::new();
    for property_id in ids.iter().copied() {
        let change = access
            .transaction(move |txn| {
                Box::pin(async move {
                    claim_write_lock(txn).await?;
                    match find_property(txn, property_id, true).await {
                        Ok(_) => Ok(reconcile_availability(txn, property_id).await?),
                        // Deleted since the sweep listed it.
                        Err(ServiceError::NotFound(_)) => Ok(None),
                        Err(e) => Err(e),
                    }
                })
            })
            .await?;
        changes.extend(change);
    }

    info!(
        properties = ids.len(),
        changed = changes.len(),
        "Availability reconciled for all properties"
    );
    Ok(changes)
}
