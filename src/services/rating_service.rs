//! Domain service for ratings.
//!
//! A rating is created once per (user, store) and afterwards only changed
//! through [`RatingService::update`]. Mutations answer with freshly computed
//! store statistics.

use serde::Serialize;

use super::ServiceError;
use crate::domain::stats::{PlatformStats, StoreStats};
use crate::domain::{Identity, RatingId, Stars, StoreId};
use crate::models::{Rating, RatingDetail, Store};

#[derive(Debug, Clone, Serialize)]
pub struct RatingWithStats {
    pub rating: Rating,
    pub store_stats: StoreStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedRating {
    pub rating: Rating,
    pub store_name: String,
    pub store_stats: StoreStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreRatings {
    pub store: Store,
    pub statistics: StoreStats,
    /// Newest first.
    pub ratings: Vec<RatingDetail>,
}

#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    /// Records the caller's first rating of a store.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown store and
    /// [`ServiceError::DuplicateRating`] if the caller already rated it.
    async fn submit(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
        stars: Stars,
        comment: String,
    ) -> Result<RatingWithStats, ServiceError>;

    /// Changes the caller's own rating. Nobody else may, admins included.
    async fn update(
        &self,
        identity: Option<&Identity>,
        id: RatingId,
        stars: Stars,
        comment: String,
    ) -> Result<RatingWithStats, ServiceError>;

    /// Deletes the caller's own rating. Nobody else may, admins included.
    async fn delete(
        &self,
        identity: Option<&Identity>,
        id: RatingId,
    ) -> Result<DeletedRating, ServiceError>;

    async fn get(&self, id: RatingId) -> Result<RatingDetail, ServiceError>;

    async fn for_store(&self, store_id: StoreId) -> Result<StoreRatings, ServiceError>;

    async fn mine(&self, identity: Option<&Identity>) -> Result<Vec<RatingDetail>, ServiceError>;

    async fn store_stats(&self, store_id: StoreId) -> Result<StoreStats, ServiceError>;

    async fn platform_stats(&self) -> Result<PlatformStats, ServiceError>;
}
