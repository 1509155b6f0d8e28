//! Error type shared by every domain service.

use serde::Serialize;
use thiserror::Error;

use crate::domain::authz::DenyReason;
use crate::models::Rating;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The request is well formed but refers to something unusable.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Carries the caller's existing rating so they can switch to an update.
    #[error("You have already rated this store. Use update instead.")]
    DuplicateRating(Box<Rating>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated(reason.message()),
            DenyReason::RoleNotPermitted { .. } | DenyReason::NotOwner { .. } => {
                Self::Forbidden(reason.message())
            }
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_deny_reasons_map_to_status_classes() {
        assert!(matches!(
            ServiceError::from(DenyReason::Unauthenticated),
            ServiceError::Unauthenticated(_)
        ));
        assert!(matches!(
            ServiceError::from(DenyReason::RoleNotPermitted { role: Role::User }),
            ServiceError::Forbidden(_)
        ));
        let err = ServiceError::from(DenyReason::NotOwner { resource: "ratings" });
        assert_eq!(err.to_string(), "You can only manage your own ratings");
    }
}
