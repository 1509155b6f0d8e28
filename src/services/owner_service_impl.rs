//! `SeaORM` implementation of the `OwnerService` trait.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::db::Storage;
use crate::domain::authz::{self, Ownership, RoleRequirement, STORE_OWNER_ONLY};
use crate::domain::stats::{StarBreakdown, StoreStats, average_of_rated};
use crate::domain::{Identity, StoreId};
use crate::models::{RatingDetail, Store};
use crate::services::ServiceError;
use crate::services::aggregation::RatingAggregator;
use crate::services::owner_service::{
    OwnerDashboard, OwnerOverview, OwnerService, OwnerStoreStats, OwnerStoreSummary, StoreRaters,
};

const RECENT_RATINGS_CONCURRENCY: usize = 4;

const STORE_OWNER: RoleRequirement = RoleRequirement::OneOf(STORE_OWNER_ONLY);

pub struct SeaOrmOwnerService {
    storage: Storage,
    aggregator: RatingAggregator,
}

impl SeaOrmOwnerService {
    #[must_use]
    pub const fn new(storage: Storage, aggregator: RatingAggregator) -> Self {
        Self {
            storage,
            aggregator,
        }
    }

    /// Loads a store and checks the caller owns it.
    async fn owned_store(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
    ) -> Result<Store, ServiceError> {
        let store = self
            .storage
            .stores()
            .get_by_id(store_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Store"))?;

        authz::require(identity, STORE_OWNER, Some(Ownership::Store(store.owner_id)))?;

        Ok(store)
    }
}

#[async_trait]
impl OwnerService for SeaOrmOwnerService {
    async fn dashboard(&self, identity: Option<&Identity>) -> Result<OwnerDashboard, ServiceError> {
        let caller = authz::require(identity, STORE_OWNER, None)?;
        let limit = self.aggregator.config().dashboard_recent_limit;

        let stores = self.storage.stores().owned_by(caller.id).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let mut stats = self.aggregator.stats_for_stores(&ids).await?;

        let recent: Vec<Vec<RatingDetail>> = stream::iter(ids)
            .map(|id| {
                let ratings = self.storage.ratings();
                async move { ratings.details_for_stores(&[id], Some(limit)).await }
            })
            .buffered(RECENT_RATINGS_CONCURRENCY)
            .try_collect()
            .await?;

        let summaries: Vec<OwnerStoreSummary> = stores
            .into_iter()
            .zip(recent)
            .map(|(store, recent_ratings)| OwnerStoreSummary {
                rating_stats: stats
                    .remove(&store.id)
                    .unwrap_or_else(|| StoreStats::from_breakdown(StarBreakdown::default())),
                store,
                recent_ratings,
            })
            .collect();

        let breakdowns: Vec<StarBreakdown> =
            summaries.iter().map(|s| s.rating_stats.star_breakdown).collect();

        Ok(OwnerDashboard {
            overview: OwnerOverview {
                total_stores: summaries.len(),
                total_ratings_received: summaries.iter().map(|s| s.rating_stats.total_ratings).sum(),
                overall_average_rating: average_of_rated(&breakdowns),
            },
            stores: summaries,
        })
    }

    async fn raters(
        &self,
        identity: Option<&Identity>,
        store_id: Option<StoreId>,
    ) -> Result<StoreRaters, ServiceError> {
        let caller = authz::require(identity, STORE_OWNER, None)?;

        let stores_included = match store_id {
            Some(id) => vec![self.owned_store(identity, id).await?],
            None => self.storage.stores().owned_by(caller.id).await?,
        };

        let ids: Vec<StoreId> = stores_included.iter().map(|s| s.id).collect();
        let ratings = self.storage.ratings().details_for_stores(&ids, None).await?;

        Ok(StoreRaters {
            ratings,
            stores_included,
        })
    }

    async fn store_stats(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
    ) -> Result<OwnerStoreStats, ServiceError> {
        authz::require(identity, STORE_OWNER, None)?;
        let store = self.owned_store(identity, store_id).await?;
        let limit = self.aggregator.config().store_stats_recent_limit;

        let rating_summary = self.aggregator.store_stats(store_id).await?;
        let recent_ratings = self
            .storage
            .ratings()
            .details_for_stores(&[store_id], Some(limit))
            .await?;

        Ok(OwnerStoreStats {
            store,
            rating_summary,
            recent_ratings,
        })
    }
}
