use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{City, PropertyType};
use crate::validation::{clean_text, validate_money};

pub mod create_property_command;
pub mod delete_property_command;
pub mod update_property_command;

pub use create_property_command::CreatePropertyCommand;
pub use delete_property_command::DeletePropertyCommand;
pub use update_property_command::UpdatePropertyCommand;

/// Property fields accepted on submit and update.
///
/// Availability is derived from leases and is not part of the input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PropertyInput {
    #[validate(length(min = 1, max = 150, message = "Title must be between 1 and 150 characters."))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Address must be between 1 and 255 characters."
    ))]
    pub address: String,
    pub city: City,
    #[validate(range(min = 1, message = "Surface area must be a positive number of square metres."))]
    pub surface_area_m2: i32,
    #[validate(custom = "validate_money")]
    pub monthly_rent: Decimal,
    pub property_type: PropertyType,
    /// Required for staff. Other actors list under their own owner record.
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub exige_validation_contrat: bool,
}

impl PropertyInput {
    pub fn normalized(self) -> Self {
        Self {
            title: clean_text(self.title),
            address: clean_text(self.address),
            ..self
        }
    }
}
