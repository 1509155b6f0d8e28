//! `SeaORM` implementation of the `StoreService` trait.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::db::{Storage, is_unique_violation};
use crate::domain::authz::{self, Ownership, RoleRequirement, STORE_OWNER_ONLY};
use crate::domain::listing::StoreListing;
use crate::domain::stats::{StarBreakdown, StoreStats};
use crate::domain::{Identity, StoreId, UserId};
use crate::models::{NewStore, Store, StoreChanges};
use crate::services::ServiceError;
use crate::services::aggregation::RatingAggregator;
use crate::services::store_service::{StoreDetail, StoreDraft, StoreListingEntry, StoreService};

const DUPLICATE_STORE_EMAIL: &str = "A store with this email already exists";

pub struct SeaOrmStoreService {
    storage: Storage,
    aggregator: RatingAggregator,
}

impl SeaOrmStoreService {
    #[must_use]
    pub const fn new(storage: Storage, aggregator: RatingAggregator) -> Self {
        Self {
            storage,
            aggregator,
        }
    }

    async fn existing(&self, id: StoreId) -> Result<Store, ServiceError> {
        self.storage
            .stores()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Store"))
    }
}

/// Inserts a store after checking the email. Shared with admin store creation.
pub async fn insert_store(storage: &Storage, new_store: NewStore) -> Result<Store, ServiceError> {
    let stores = storage.stores();

    if stores.email_taken(&new_store.email, None).await? {
        return Err(ServiceError::Conflict(DUPLICATE_STORE_EMAIL.to_string()));
    }

    let store = stores.create(new_store).await.map_err(|err| {
        if is_unique_violation(&err) {
            ServiceError::Conflict(DUPLICATE_STORE_EMAIL.to_string())
        } else {
            ServiceError::from(err)
        }
    })?;

    metrics::counter!("stores_created_total").increment(1);
    tracing::info!(store_id = %store.id, owner_id = %store.owner_id, "Store created");

    Ok(store)
}

#[async_trait]
impl StoreService for SeaOrmStoreService {
    async fn create(
        &self,
        identity: Option<&Identity>,
        draft: StoreDraft,
    ) -> Result<Store, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::OneOf(STORE_OWNER_ONLY), None)?;

        insert_store(
            &self.storage,
            NewStore {
                name: draft.name,
                email: draft.email,
                address: draft.address,
                owner_id: caller.id,
            },
        )
        .await
    }

    async fn list(
        &self,
        identity: Option<&Identity>,
        listing: &StoreListing,
    ) -> Result<Vec<StoreListingEntry>, ServiceError> {
        let stores = self.storage.stores().list(listing).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.store.id).collect();

        let mut stats = self.aggregator.stats_for_stores(&ids).await?;
        let mut own_ratings = match identity {
            Some(caller) => {
                self.storage
                    .ratings()
                    .by_user_for_stores(caller.id, &ids)
                    .await?
            }
            None => HashMap::new(),
        };

        Ok(stores
            .into_iter()
            .map(|store| {
                let id = store.store.id;
                StoreListingEntry {
                    stats: stats
                        .remove(&id)
                        .unwrap_or_else(|| StoreStats::from_breakdown(StarBreakdown::default())),
                    user_rating: own_ratings.remove(&id),
                    store,
                }
            })
            .collect())
    }

    async fn get(&self, id: StoreId) -> Result<StoreDetail, ServiceError> {
        let store = self
            .storage
            .stores()
            .get_with_owner(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Store"))?;

        let stats = self.aggregator.store_stats(id).await?;

        Ok(StoreDetail { store, stats })
    }

    async fn stores_owned_by(&self, owner: UserId) -> Result<Vec<Store>, ServiceError> {
        Ok(self.storage.stores().owned_by(owner).await?)
    }

    async fn my_stores(&self, identity: Option<&Identity>) -> Result<Vec<Store>, ServiceError> {
        let caller = authz::require(identity, RoleRequirement::Authenticated, None)?;
        self.stores_owned_by(caller.id).await
    }

    async fn update(
        &self,
        identity: Option<&Identity>,
        id: StoreId,
        changes: StoreChanges,
    ) -> Result<Store, ServiceError> {
        authz::require(identity, RoleRequirement::Authenticated, None)?;
        let store = self.existing(id).await?;
        authz::require(
            identity,
            RoleRequirement::Authenticated,
            Some(Ownership::Store(store.owner_id)),
        )?;

        if changes.is_empty() {
            return Ok(store);
        }

        if let Some(email) = &changes.email
            && self.storage.stores().email_taken(email, Some(id)).await?
        {
            return Err(ServiceError::Conflict(DUPLICATE_STORE_EMAIL.to_string()));
        }

        let updated = self
            .storage
            .stores()
            .update(id, changes)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ServiceError::Conflict(DUPLICATE_STORE_EMAIL.to_string())
                } else {
                    ServiceError::from(err)
                }
            })?
            .ok_or_else(|| ServiceError::not_found("Store"))?;

        tracing::info!(store_id = %id, "Store updated");

        Ok(updated)
    }

    async fn delete(
        &self,
        identity: Option<&Identity>,
        id: StoreId,
    ) -> Result<Store, ServiceError> {
        authz::require(identity, RoleRequirement::Authenticated, None)?;
        let store = self.existing(id).await?;
        authz::require(
            identity,
            RoleRequirement::Authenticated,
            Some(Ownership::Store(store.owner_id)),
        )?;

        if !self.storage.stores().delete(id).await? {
            return Err(ServiceError::not_found("Store"));
        }

        tracing::info!(store_id = %id, "Store deleted");

        Ok(store)
    }
}
