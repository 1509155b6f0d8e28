use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::{listing, now_timestamp};
use crate::domain::listing::{UserField, UserListing};
use crate::domain::{Role, UserId};
use crate::entities::{prelude::*, users};
use crate::models::{NewUser, User};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user with a freshly hashed password and bearer token.
    ///
    /// A taken email surfaces as a unique violation from the database.
    pub async fn create(&self, new_user: NewUser, security: &SecurityConfig) -> Result<User> {
        let password = new_user.password;
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = now_timestamp();
        let active = users::ActiveModel {
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            address: Set(new_user.address),
            role: Set(new_user.role.as_str().to_string()),
            api_token: Set(generate_api_token()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        User::try_from(model)
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?
            .map(User::try_from)
            .transpose()
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check user email")?;

        Ok(count > 0)
    }

    /// Checks a login attempt. Returns the user and their current token when
    /// the email exists and the password matches.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<(User, String)>> {
        let Some(model) = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?
        else {
            return Ok(None);
        };

        if !verify_password(password, &model.password_hash).await? {
            return Ok(None);
        }

        let token = model.api_token.clone();
        Ok(Some((User::try_from(model)?, token)))
    }

    /// Checks `password` against the stored hash of user `id`.
    pub async fn verify_password_for(&self, id: UserId, password: &str) -> Result<bool> {
        let Some(model) = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?
        else {
            return Ok(false);
        };

        verify_password(password, &model.password_hash).await
    }

    /// Resolves a bearer token to its user.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>> {
        Users::find()
            .filter(users::Column::ApiToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by token")?
            .map(User::try_from)
            .transpose()
    }

    pub async fn get_token(&self, id: UserId) -> Result<Option<String>> {
        let token = Users::find_by_id(id.value())
            .select_only()
            .column(users::Column::ApiToken)
            .into_tuple::<String>()
            .one(&self.conn)
            .await
            .context("Failed to query user token")?;

        Ok(token)
    }

    /// Stores a new password hash and rotates the bearer token. Returns the
    /// new token; the previous one stops resolving immediately.
    pub async fn update_password(
        &self,
        id: UserId,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<String> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let security = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let new_token = generate_api_token();

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.api_token = Set(new_token.clone());
        active.updated_at = Set(now_timestamp());
        active
            .update(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(new_token)
    }

    pub async fn list(&self, listing: &UserListing) -> Result<Vec<User>> {
        let query = listing::apply(
            Users::find(),
            listing,
            listing::user_filter_column,
            listing::user_sort_column,
            users::Column::Id,
        );

        let mut users = query
            .all(&self.conn)
            .await
            .context("Failed to list users")?
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;

        listing.retain_matching(&mut users, |user, field| match field {
            UserField::Name => user.name.as_str(),
            UserField::Email => user.email.as_str(),
            UserField::Address => user.address.as_str(),
            UserField::Role => user.role.as_str(),
        });

        Ok(users)
    }

    pub async fn count(&self) -> Result<u64> {
        Users::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        Users::find()
            .filter(users::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("Failed to count recent users")
    }

    /// Number of users per role. Roles with no users are absent.
    pub async fn count_by_role(&self) -> Result<Vec<(Role, u64)>> {
        let rows: Vec<(String, i64)> = Users::find()
            .select_only()
            .column(users::Column::Role)
            .column_as(users::Column::Id.count(), "count")
            .group_by(users::Column::Role)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count users by role")?;

        rows.into_iter()
            .map(|(role, count)| -> Result<(Role, u64)> {
                Ok((role.parse::<Role>()?, u64::try_from(count).unwrap_or(0)))
            })
            .collect()
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verifies on the blocking pool; Argon2 would otherwise stall the runtime.
async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Generate a random bearer token (64 character hex string)
#[must_use]
pub fn generate_api_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_generated_tokens_are_hex_and_distinct() {
        let a = generate_api_token();
        let b = generate_api_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("Secret!Pass1", &cheap_security()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret!Pass1", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }
}
