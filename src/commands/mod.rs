use crate::{
    db::{supports_row_locks, DbPool},
    entities::{lease, owner, property},
    errors::ServiceError,
    events::EventSender,
};
use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    SqlErr,
};
use std::sync::Arc;
use uuid::Uuid;

pub mod leases;
pub mod owners;
pub mod properties;

/// Command trait for implementing the Command Pattern
///
/// A command carries the acting identity and its input, validates both, runs
/// its writes in one transaction and publishes its events once committed.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish domain events
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

/// Takes the database write lock on backends without row locks.
///
/// Must be the first statement of the transaction. SQLite only waits on its
/// busy timeout for a transaction that holds no read lock yet; one that read
/// first fails with `SQLITE_BUSY` when it tries to write.
pub(crate) async fn claim_write_lock<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    if supports_row_locks(db.get_database_backend()) {
        return Ok(());
    }
    // Matches no row; the statement only opens the write transaction.
    property::Entity::update_many()
        .col_expr(
            property::Column::CreatedAt,
            Expr::col(property::Column::CreatedAt).into(),
        )
        .filter(property::Column::Id.is_null())
        .exec(db)
        .await?;
    Ok(())
}

pub(crate) async fn find_owner<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<owner::Model, ServiceError> {
    owner::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Owner {} not found", id)))
}

/// Loads a property, taking a row lock on backends that support one.
pub(crate) async fn find_property<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    lock: bool,
) -> Result<property::Model, ServiceError> {
    let mut query = property::Entity::find_by_id(id);
    if lock && supports_row_locks(db.get_database_backend()) {
        query = query.lock_exclusive();
    }
    query
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Property {} not found", id)))
}

pub(crate) async fn find_lease<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<lease::Model, ServiceError> {
    lease::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Lease {} not found", id)))
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
