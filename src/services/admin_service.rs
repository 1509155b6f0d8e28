//! Domain service behind the admin console. Every operation requires the
//! `admin` role.

use serde::Serialize;

use super::ServiceError;
use crate::domain::listing::{StoreListing, UserListing};
use crate::domain::stats::{PlatformStats, StoreStats};
use crate::domain::{Identity, UserId};
use crate::models::{NewStore, NewUser, Store, StoreWithOwner, User};

/// A listed user. Store owners also carry the mean of every rating on
/// their stores; `None` for everyone else and for owners without ratings.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user: User,
    pub average_rating: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedStoreSummary {
    pub store: Store,
    pub stats: StoreStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    pub user: User,
    /// Present for store owners only.
    pub stores: Option<Vec<OwnedStoreSummary>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStoreEntry {
    pub store: StoreWithOwner,
    pub stats: StoreStats,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard(&self, identity: Option<&Identity>) -> Result<PlatformStats, ServiceError>;

    /// Creates a user with an explicit role.
    async fn create_user(
        &self,
        identity: Option<&Identity>,
        new_user: NewUser,
    ) -> Result<User, ServiceError>;

    async fn list_users(
        &self,
        identity: Option<&Identity>,
        listing: &UserListing,
    ) -> Result<Vec<UserSummary>, ServiceError>;

    async fn user_details(
        &self,
        identity: Option<&Identity>,
        id: UserId,
    ) -> Result<UserDetails, ServiceError>;

    /// Creates a store on behalf of `new_store.owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the owner does not exist and
    /// [`ServiceError::BadRequest`] if they are not a store owner.
    async fn create_store(
        &self,
        identity: Option<&Identity>,
        new_store: NewStore,
    ) -> Result<StoreWithOwner, ServiceError>;

    async fn list_stores(
        &self,
        identity: Option<&Identity>,
        listing: &StoreListing,
    ) -> Result<Vec<AdminStoreEntry>, ServiceError>;
}
