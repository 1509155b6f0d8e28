//! `SeaORM` implementation of the `RatingService` trait.

use async_trait::async_trait;

use crate::db::{Storage, is_unique_violation};
use crate::domain::authz::{self, Ownership, RoleRequirement};
use crate::domain::stats::{PlatformStats, StoreStats};
use crate::domain::{Identity, RatingId, Stars, StoreId};
use crate::models::{Rating, RatingDetail};
use crate::services::ServiceError;
use crate::services::aggregation::RatingAggregator;
use crate::services::rating_service::{
    DeletedRating, RatingService, RatingWithStats, StoreRatings,
};

pub struct SeaOrmRatingService {
    storage: Storage,
    aggregator: RatingAggregator,
}

impl SeaOrmRatingService {
    #[must_use]
    pub const fn new(storage: Storage, aggregator: RatingAggregator) -> Self {
        Self {
            storage,
            aggregator,
        }
    }

    /// Loads a rating and checks the caller owns it.
    async fn owned_rating(
        &self,
        identity: Option<&Identity>,
        id: RatingId,
    ) -> Result<Rating, ServiceError> {
        authz::require(identity, RoleRequirement::Authenticated, None)?;

        let rating = self
            .storage
            .ratings()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Rating"))?;

        authz::require(
            identity,
            RoleRequirement::Authenticated,
            Some(Ownership::Rating(rating.user_id)),
        )?;

        Ok(rating)
    }
}

#[async_trait]
impl RatingService for SeaOrmRatingService {
    async fn submit(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
        stars: Stars,
        comment: String,
    ) -> Result<RatingWithStats, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::Authenticated, None)?;
        let ratings = self.storage.ratings();

        if self.storage.stores().get_by_id(store_id).await?.is_none() {
            return Err(ServiceError::not_found("Store"));
        }

        if let Some(existing) = ratings.find_for(caller.id, store_id).await? {
            return Err(ServiceError::DuplicateRating(Box::new(existing)));
        }

        let rating = match ratings.create(caller.id, store_id, stars, comment).await {
            Ok(rating) => rating,
            // Lost a race with a concurrent submission from the same user.
            Err(err) if is_unique_violation(&err) => {
                let existing = ratings
                    .find_for(caller.id, store_id)
                    .await?
                    .ok_or_else(|| ServiceError::from(err))?;
                return Err(ServiceError::DuplicateRating(Box::new(existing)));
            }
            Err(err) => return Err(err.into()),
        };

        metrics::counter!("ratings_submitted_total").increment(1);
        tracing::info!(
            rating_id = %rating.id,
            store_id = %store_id,
            user_id = %caller.id,
            stars = stars.value(),
            "Rating submitted"
        );

        let store_stats = self.aggregator.store_stats(store_id).await?;

        Ok(RatingWithStats {
            rating,
            store_stats,
        })
    }

    async fn update(
        &self,
        identity: Option<&Identity>,
        id: RatingId,
        stars: Stars,
        comment: String,
    ) -> Result<RatingWithStats, ServiceError> {
        let existing = self.owned_rating(identity, id).await?;

        let rating = self
            .storage
            .ratings()
            .update(id, stars, comment)
            .await?
            .ok_or_else(|| ServiceError::not_found("Rating"))?;

        metrics::counter!("ratings_updated_total").increment(1);
        tracing::info!(rating_id = %id, stars = stars.value(), "Rating updated");

        let store_stats = self.aggregator.store_stats(existing.store_id).await?;

        Ok(RatingWithStats {
            rating,
            store_stats,
        })
    }

    async fn delete(
        &self,
        identity: Option<&Identity>,
        id: RatingId,
    ) -> Result<DeletedRating, ServiceError> {
        let rating = self.owned_rating(identity, id).await?;

        let store_name = self
            .storage
            .stores()
            .get_by_id(rating.store_id)
            .await?
            .map(|store| store.name)
            .unwrap_or_default();

        if !self.storage.ratings().delete(id).await? {
            return Err(ServiceError::not_found("Rating"));
        }

        metrics::counter!("ratings_deleted_total").increment(1);
        tracing::info!(rating_id = %id, store_id = %rating.store_id, "Rating deleted");

        let store_stats = self.aggregator.store_stats(rating.store_id).await?;

        Ok(DeletedRating {
            rating,
            store_name,
            store_stats,
        })
    }

    async fn get(&self, id: RatingId) -> Result<RatingDetail, ServiceError> {
        self.storage
            .ratings()
            .detail(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Rating"))
    }

    async fn for_store(&self, store_id: StoreId) -> Result<StoreRatings, ServiceError> {
        let store = self
            .storage
            .stores()
            .get_by_id(store_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Store"))?;

        let ratings = self
            .storage
            .ratings()
            .details_for_stores(&[store_id], None)
            .await?;
        let statistics = self.aggregator.store_stats(store_id).await?;

        Ok(StoreRatings {
            store,
            statistics,
            ratings,
        })
    }

    async fn mine(&self, identity: Option<&Identity>) -> Result<Vec<RatingDetail>, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::Authenticated, None)?;
        Ok(self.storage.ratings().details_by_user(caller.id).await?)
    }

    async fn store_stats(&self, store_id: StoreId) -> Result<StoreStats, ServiceError> {
        self.aggregator.store_stats(store_id).await
    }

    async fn platform_stats(&self) -> Result<PlatformStats, ServiceError> {
        self.aggregator.platform_stats().await
    }
}
