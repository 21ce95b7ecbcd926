//! Acting identity supplied by the fronting gateway.
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user as `X-Actor-Id` and marks staff accounts with `X-Actor-Staff`.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::entities::owner;
use crate::errors::ServiceError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_STAFF_HEADER: &str = "x-actor-staff";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    /// Only honoured for authenticated actors.
    pub is_staff: bool,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_staff: false,
        }
    }

    pub fn staff(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_staff: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.is_authenticated() && self.is_staff
    }

    /// The user id, or `Unauthorized` for anonymous actors.
    pub fn require_authenticated(&self) -> Result<Uuid, ServiceError> {
        self.user_id
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))
    }

    pub fn require_staff(&self) -> Result<(), ServiceError> {
        self.require_authenticated()?;
        if self.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Only staff may perform this action".to_string(),
            ))
        }
    }

    /// Whether this actor is the identity linked to `owner`.
    pub fn is_owner(&self, owner: &owner::Model) -> bool {
        self.user_id.is_some() && owner.user_id == self.user_id
    }

    /// Staff, or the identity linked to `owner`, may manage the owner's records.
    pub fn ensure_can_manage(&self, owner: &owner::Model) -> Result<(), ServiceError> {
        self.require_authenticated()?;
        if self.is_staff() || self.is_owner(owner) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You do not have permission to modify this record".to_string(),
            ))
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = match parts.headers.get(ACTOR_ID_HEADER) {
            None => None,
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    ServiceError::Unauthorized("Malformed actor header".to_string())
                })?;
                Some(Uuid::parse_str(raw.trim()).map_err(|_| {
                    ServiceError::Unauthorized("Malformed actor header".to_string())
                })?)
            }
        };

        let is_staff = parts
            .headers
            .get(ACTOR_STAFF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        Ok(Actor { user_id, is_staff })
    }
}
