use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::commands::is_unique_violation;
use crate::errors::ServiceError;
use crate::validation::{
    clean_optional, clean_text, lease::ALREADY_ACTIVE, validate_money, FieldErrors,
    LeaseCandidate,
};

pub mod delete_lease_command;
pub mod submit_lease_command;
pub mod update_lease_command;

pub use delete_lease_command::DeleteLeaseCommand;
pub use submit_lease_command::SubmitLeaseCommand;
pub use update_lease_command::UpdateLeaseCommand;

fn default_active() -> bool {
    true
}

/// Lease submission. The same payload is used to edit a lease.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LeaseInput {
    /// Owner the submitter believes owns the property.
    pub owner_id: Uuid,
    pub property_id: Uuid,
    #[validate(length(
        min = 1,
        max = 120,
        message = "Tenant name must be between 1 and 120 characters."
    ))]
    pub tenant_name: String,
    #[validate(length(max = 20, message = "Tenant phone must be at most 20 characters."))]
    pub tenant_phone: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub tenant_email: Option<String>,
    pub tenant_notes: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(custom = "validate_money")]
    pub deposit: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Tenant accepts the owner's contract terms.
    #[serde(default)]
    pub accept_contract: bool,
}

impl LeaseInput {
    pub fn normalized(self) -> Self {
        Self {
            tenant_name: clean_text(self.tenant_name),
            tenant_phone: clean_optional(self.tenant_phone),
            tenant_email: clean_optional(self.tenant_email),
            tenant_notes: clean_optional(self.tenant_notes),
            ..self
        }
    }

    pub fn candidate(&self, lease_id: Option<Uuid>) -> LeaseCandidate {
        LeaseCandidate {
            id: lease_id,
            property_id: self.property_id,
            start_date: self.start_date,
            end_date: self.end_date,
            active: self.active,
            accept_contract: self.accept_contract,
        }
    }
}

/// A write that tripped the one-active-lease index lost a race with another
/// submission; report it like the pre-write check does.
pub(crate) fn map_lease_write_error(e: DbErr) -> ServiceError {
    if is_unique_violation(&e) {
        let mut errors = FieldErrors::new();
        errors.add("active", ALREADY_ACTIVE);
        ServiceError::ValidationError(errors)
    } else {
        error!(error = %e, "Failed to write lease");
        ServiceError::db_error(e)
    }
}
