//! Request extractors whose rejections use the standard error envelope.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use super::ApiError;
use crate::domain::authz::{self, RoleRequirement};
use crate::domain::{Identity, Role};
use crate::services::ServiceError;

/// JSON body; malformed or mistyped bodies become 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Path parameters; a non-numeric id becomes 400.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// The caller's identity as resolved by the identity middleware, or `None`
/// for an anonymous request. Whether anonymity is acceptable is decided by
/// the service being called.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    /// Rejects anonymous callers before the body is validated, so they see
    /// 401 rather than field errors.
    pub fn authenticated(&self) -> Result<&Identity, ApiError> {
        authz::require(self.identity(), RoleRequirement::Authenticated, None)
            .map_err(|reason| ServiceError::from(reason).into())
    }

    pub fn with_role(&self, roles: &'static [Role]) -> Result<&Identity, ApiError> {
        authz::require(self.identity(), RoleRequirement::OneOf(roles), None)
            .map_err(|reason| ServiceError::from(reason).into())
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}
