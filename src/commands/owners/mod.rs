use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::owner;
use crate::errors::ServiceError;
use crate::validation::{clean_optional, clean_text};

pub mod create_owner_command;
pub mod delete_owner_command;
pub mod update_owner_command;

pub use create_owner_command::CreateOwnerCommand;
pub use delete_owner_command::DeleteOwnerCommand;
pub use update_owner_command::UpdateOwnerCommand;

/// Owner fields accepted on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OwnerInput {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Full name must be between 1 and 120 characters."
    ))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Telephone must be at most 20 characters."))]
    pub telephone: Option<String>,
    /// Authenticated identity to link. Staff only.
    pub user_id: Option<Uuid>,
}

impl OwnerInput {
    pub fn normalized(self) -> Self {
        Self {
            full_name: clean_text(self.full_name),
            email: clean_optional(self.email),
            telephone: clean_optional(self.telephone),
            user_id: self.user_id,
        }
    }
}

/// Rejects a link to an identity that another owner already holds.
pub(crate) async fn ensure_identity_free<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = owner::Entity::find().filter(owner::Column::UserId.eq(user_id));
    if let Some(id) = except {
        query = query.filter(owner::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!(
            "User {} is already linked to an owner",
            user_id
        )));
    }
    Ok(())
}

pub(crate) fn identity_conflict(user_id: Option<Uuid>) -> ServiceError {
    ServiceError::Conflict(match user_id {
        Some(id) => format!("User {} is already linked to an owner", id),
        None => "Owner identity link already in use".to_string(),
    })
}
