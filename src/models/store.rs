use serde::Serialize;

use crate::domain::{StoreId, UserId};
use crate::entities::stores;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Self {
            id: StoreId::new(model.id),
            name: model.name,
            email: model.email,
            address: model.address,
            owner_id: UserId::new(model.owner_id),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A store joined with its owner's public details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreWithOwner {
    #[serde(flatten)]
    pub store: Store,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl StoreChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.address.is_none()
    }
}
