//! Domain service for store owners looking at feedback on their own stores.

use serde::Serialize;

use super::ServiceError;
use crate::domain::stats::StoreStats;
use crate::domain::{Identity, StoreId};
use crate::models::{RatingDetail, Store};

#[derive(Debug, Clone, Serialize)]
pub struct OwnerOverview {
    pub total_stores: usize,
    pub total_ratings_received: u64,
    /// Mean of per-store averages over stores that have ratings.
    pub overall_average_rating: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerStoreSummary {
    pub store: Store,
    pub rating_stats: StoreStats,
    pub recent_ratings: Vec<RatingDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerDashboard {
    pub overview: OwnerOverview,
    pub stores: Vec<OwnerStoreSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreRaters {
    /// Newest first.
    pub ratings: Vec<RatingDetail>,
    pub stores_included: Vec<Store>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerStoreStats {
    pub store: Store,
    pub rating_summary: StoreStats,
    pub recent_ratings: Vec<RatingDetail>,
}

#[async_trait::async_trait]
pub trait OwnerService: Send + Sync {
    async fn dashboard(&self, identity: Option<&Identity>) -> Result<OwnerDashboard, ServiceError>;

    /// Ratings left on the caller's stores, or on one of them.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown store and
    /// [`ServiceError::Forbidden`] for a store the caller does not own.
    async fn raters(
        &self,
        identity: Option<&Identity>,
        store_id: Option<StoreId>,
    ) -> Result<StoreRaters, ServiceError>;

    async fn store_stats(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
    ) -> Result<OwnerStoreStats, ServiceError>;
}
