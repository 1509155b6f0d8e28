//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Storage, is_unique_violation};
use crate::domain::authz::{self, RoleRequirement};
use crate::domain::{Identity, Role, UserId};
use crate::models::{NewUser, User};
use crate::services::ServiceError;
use crate::services::auth_service::{AuthService, AuthSession};

pub struct SeaOrmAuthService {
    storage: Storage,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(storage: Storage, security: SecurityConfig) -> Self {
        Self { storage, security }
    }
}

/// Creates an account with the role `new_user` carries. Shared by signup,
/// admin user creation and the CLI.
pub async fn create_account(
    storage: &Storage,
    security: &SecurityConfig,
    new_user: NewUser,
) -> Result<User, ServiceError> {
    let users = storage.users();

    if users.email_exists(&new_user.email).await? {
        return Err(ServiceError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let user = users.create(new_user, security).await.map_err(|err| {
        if is_unique_violation(&err) {
            ServiceError::Conflict("User with this email already exists".to_string())
        } else {
            ServiceError::from(err)
        }
    })?;

    metrics::counter!("users_created_total", "role" => user.role.as_str()).increment(1);
    tracing::info!(user_id = %user.id, role = %user.role, "User created");

    Ok(user)
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, new_user: NewUser) -> Result<AuthSession, ServiceError> {
        let new_user = NewUser {
            role: Role::User,
            ..new_user
        };
        let user = create_account(&self.storage, &self.security, new_user).await?;

        let token = self
            .storage
            .users()
            .get_token(user.id)
            .await?
            .ok_or_else(|| ServiceError::Internal("Token missing for new user".to_string()))?;

        Ok(AuthSession { user, token })
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let (user, token) = self
            .storage
            .users()
            .verify_credentials(email, password)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("Invalid email or password".to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthSession { user, token })
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<Identity>, ServiceError> {
        let user = self.storage.users().get_by_token(token).await?;
        Ok(user.map(|u| u.identity()))
    }

    async fn resolve_user(&self, id: UserId) -> Result<Option<Identity>, ServiceError> {
        let user = self.storage.users().get_by_id(id).await?;
        Ok(user.map(|u| u.identity()))
    }

    async fn profile(&self, identity: Option<&Identity>) -> Result<User, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::Authenticated, None)?;

        self.storage
            .users()
            .get_by_id(caller.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    async fn change_password(
        &self,
        identity: Option<&Identity>,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::Authenticated, None)?;
        let users = self.storage.users();

        if !users.verify_password_for(caller.id, current_password).await? {
            return Err(ServiceError::field(
                "current_password",
                "Current password is incorrect",
            ));
        }

        let token = users
            .update_password(caller.id, new_password, &self.security)
            .await?;

        tracing::info!(user_id = %caller.id, "Password changed");

        Ok(token)
    }
}
