//! Domain service for store management and public store listings.

use serde::Serialize;

use super::ServiceError;
use crate::domain::listing::StoreListing;
use crate::domain::stats::StoreStats;
use crate::domain::{Identity, StoreId, UserId};
use crate::models::{Rating, Store, StoreChanges, StoreWithOwner};

/// Fields a store owner supplies when creating their own store.
#[derive(Debug, Clone)]
pub struct StoreDraft {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// One row of the public store listing.
#[derive(Debug, Clone, Serialize)]
pub struct StoreListingEntry {
    pub store: StoreWithOwner,
    pub stats: StoreStats,
    /// The caller's own rating, when authenticated and present.
    pub user_rating: Option<Rating>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreDetail {
    pub store: StoreWithOwner,
    pub stats: StoreStats,
}

#[async_trait::async_trait]
pub trait StoreService: Send + Sync {
    /// Creates a store owned by the caller, who must be a store owner.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if another store uses the email.
    async fn create(
        &self,
        identity: Option<&Identity>,
        draft: StoreDraft,
    ) -> Result<Store, ServiceError>;

    /// Filtered, sorted listing. Anonymous callers are allowed.
    async fn list(
        &self,
        identity: Option<&Identity>,
        listing: &StoreListing,
    ) -> Result<Vec<StoreListingEntry>, ServiceError>;

    async fn get(&self, id: StoreId) -> Result<StoreDetail, ServiceError>;

    /// Stores whose owner is `owner`.
    async fn stores_owned_by(&self, owner: UserId) -> Result<Vec<Store>, ServiceError>;

    /// [`Self::stores_owned_by`] for the authenticated caller.
    async fn my_stores(&self, identity: Option<&Identity>) -> Result<Vec<Store>, ServiceError>;

    /// Partial update by the store's owner or an admin.
    async fn update(
        &self,
        identity: Option<&Identity>,
        id: StoreId,
        changes: StoreChanges,
    ) -> Result<Store, ServiceError>;

    /// Deletes a store and its ratings. Owner or admin only.
    async fn delete(&self, identity: Option<&Identity>, id: StoreId)
    -> Result<Store, ServiceError>;
}
