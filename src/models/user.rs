use serde::Serialize;

use crate::domain::{Identity, Role, UserId};
use crate::entities::users;

/// A user as the rest of the crate sees it. The password hash and bearer
/// token never leave the repository through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl TryFrom<users::Model> for User {
    type Error = anyhow::Error;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(model.id),
            role: model.role.parse()?,
            name: model.name,
            email: model.email,
            address: model.address,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Fields required to create a user. The password is plain text here and is
/// hashed by the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: Role,
}
