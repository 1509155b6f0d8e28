//! Domain service for accounts and credentials.
//!
//! Handles signup, login, bearer-token resolution and password changes. The
//! token is opaque to the rest of the crate: it resolves to an [`Identity`].

use serde::Serialize;

use super::ServiceError;
use crate::domain::{Identity, UserId};
use crate::models::{NewUser, User};

/// A user together with the bearer token that authenticates them.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Self-service registration. The role is always [`Role::User`],
    /// whatever `new_user` carries.
    ///
    /// [`Role::User`]: crate::domain::Role::User
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if the email is already registered.
    async fn signup(&self, new_user: NewUser) -> Result<AuthSession, ServiceError>;

    /// Verifies credentials and returns the user with their token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthenticated`] for an unknown email or a
    /// wrong password, without saying which.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError>;

    /// Resolves a bearer token. `None` means the token is not recognised.
    async fn resolve_token(&self, token: &str) -> Result<Option<Identity>, ServiceError>;

    /// Resolves a user id stored in a session.
    async fn resolve_user(&self, id: UserId) -> Result<Option<Identity>, ServiceError>;

    async fn profile(&self, identity: Option<&Identity>) -> Result<User, ServiceError>;

    /// Changes the caller's password and returns the rotated token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if the current password is wrong.
    async fn change_password(
        &self,
        identity: Option<&Identity>,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, ServiceError>;
}
