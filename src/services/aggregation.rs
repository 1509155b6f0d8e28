//! Rating aggregation engine.
//!
//! Every statistic is recomputed from the rating rows present at call time.
//! Nothing is memoised, so a rating written by one request is reflected in
//! the next read.

use std::collections::HashMap;

use crate::config::RatingsConfig;
use crate::db::{Storage, window_start};
use crate::domain::Role;
use crate::domain::stats::{
    PlatformStats, RecentActivity, RoleBreakdown, StarBreakdown, StoreStats,
};
use crate::domain::{StoreId, UserId};
use crate::services::ServiceError;

#[derive(Clone)]
pub struct RatingAggregator {
    storage: Storage,
    config: RatingsConfig,
}

impl RatingAggregator {
    #[must_use]
    pub const fn new(storage: Storage, config: RatingsConfig) -> Self {
        Self { storage, config }
    }

    #[must_use]
    pub const fn config(&self) -> &RatingsConfig {
        &self.config
    }

    /// Count, mean and star histogram for one store.
    pub async fn store_stats(&self, store_id: StoreId) -> Result<StoreStats, ServiceError> {
        let breakdown = self.storage.ratings().star_counts(store_id).await?;
        Ok(StoreStats::from_breakdown(breakdown))
    }

    /// [`Self::store_stats`] for several stores in one query. Every requested
    /// store gets an entry, zeroed when it has no ratings.
    pub async fn stats_for_stores(
        &self,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, StoreStats>, ServiceError> {
        let mut breakdowns = self.storage.ratings().star_counts_by_store(store_ids).await?;

        Ok(store_ids
            .iter()
            .map(|id| {
                let breakdown = breakdowns.remove(id).unwrap_or_default();
                (*id, StoreStats::from_breakdown(breakdown))
            })
            .collect())
    }

    /// Mean over every rating on every store of each owner.
    pub async fn owner_averages(
        &self,
        owner_ids: &[UserId],
    ) -> Result<HashMap<UserId, StarBreakdown>, ServiceError> {
        Ok(self.storage.ratings().star_counts_by_owner(owner_ids).await?)
    }

    /// Platform-wide rollup for the admin dashboard.
    pub async fn platform_stats(&self) -> Result<PlatformStats, ServiceError> {
        let since = window_start(self.config.stats_window_days);
        let users = self.storage.users();
        let stores = self.storage.stores();
        let ratings = self.storage.ratings();

        let (total_users, total_stores, histogram) = tokio::try_join!(
            users.count(),
            stores.count(),
            ratings.platform_star_counts(),
        )?;

        let (users_this_month, stores_this_month, ratings_this_month) = tokio::try_join!(
            users.count_created_since(&since),
            stores.count_created_since(&since),
            ratings.count_created_since(&since),
        )?;

        let mut users_by_role = RoleBreakdown::default();
        for (role, count) in users.count_by_role().await? {
            match role {
                Role::Admin => users_by_role.admins = count,
                Role::StoreOwner => users_by_role.store_owners = count,
                Role::User => users_by_role.users = count,
            }
        }

        let summary = StoreStats::from_breakdown(histogram);

        Ok(PlatformStats {
            total_users,
            total_stores,
            total_ratings: summary.total_ratings,
            recent_activity: RecentActivity {
                users_this_month,
                stores_this_month,
                ratings_this_month,
            },
            average_platform_rating: summary.average_rating,
            users_by_role,
        })
    }
}
