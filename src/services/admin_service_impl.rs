//! `SeaORM` implementation of the `AdminService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::Storage;
use crate::domain::authz::{self, ADMIN_ONLY, RoleRequirement};
use crate::domain::listing::{StoreListing, UserListing};
use crate::domain::stats::{PlatformStats, StarBreakdown, StoreStats, format_average};
use crate::domain::{Identity, Role, StoreId, UserId};
use crate::models::{NewStore, NewUser, StoreWithOwner, User};
use crate::services::ServiceError;
use crate::services::admin_service::{
    AdminService, AdminStoreEntry, OwnedStoreSummary, UserDetails, UserSummary,
};
use crate::services::aggregation::RatingAggregator;
use crate::services::auth_service_impl::create_account;
use crate::services::store_service_impl::insert_store;

const ADMIN: RoleRequirement = RoleRequirement::OneOf(ADMIN_ONLY);

pub struct SeaOrmAdminService {
    storage: Storage,
    security: SecurityConfig,
    aggregator: RatingAggregator,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(
        storage: Storage,
        security: SecurityConfig,
        aggregator: RatingAggregator,
    ) -> Self {
        Self {
            storage,
            security,
            aggregator,
        }
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn dashboard(&self, identity: Option<&Identity>) -> Result<PlatformStats, ServiceError> {
        authz::require(identity, ADMIN, None)?;
        self.aggregator.platform_stats().await
    }

    async fn create_user(
        &self,
        identity: Option<&Identity>,
        new_user: NewUser,
    ) -> Result<User, ServiceError> {
        let admin = authz::require(identity, ADMIN, None)?;
        let user = create_account(&self.storage, &self.security, new_user).await?;
        tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin created user");
        Ok(user)
    }

    async fn list_users(
        &self,
        identity: Option<&Identity>,
        listing: &UserListing,
    ) -> Result<Vec<UserSummary>, ServiceError> {
        authz::require(identity, ADMIN, None)?;

        let users = self.storage.users().list(listing).await?;
        let owner_ids: Vec<UserId> = users
            .iter()
            .filter(|u| u.role == Role::StoreOwner)
            .map(|u| u.id)
            .collect();
        let mut averages = self.aggregator.owner_averages(&owner_ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let average_rating = averages
                    .remove(&user.id)
                    .and_then(|breakdown| breakdown.mean())
                    .map(|mean| format_average(Some(mean)));
                UserSummary {
                    user,
                    average_rating,
                }
            })
            .collect())
    }

    async fn user_details(
        &self,
        identity: Option<&Identity>,
        id: UserId,
    ) -> Result<UserDetails, ServiceError> {
        authz::require(identity, ADMIN, None)?;

        let user = self
            .storage
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        if user.role != Role::StoreOwner {
            return Ok(UserDetails { user, stores: None });
        }

        let stores = self.storage.stores().owned_by(id).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let mut stats = self.aggregator.stats_for_stores(&ids).await?;

        let stores = stores
            .into_iter()
            .map(|store| OwnedStoreSummary {
                stats: stats
                    .remove(&store.id)
                    .unwrap_or_else(|| StoreStats::from_breakdown(StarBreakdown::default())),
                store,
            })
            .collect();

        Ok(UserDetails {
            user,
            stores: Some(stores),
        })
    }

    async fn create_store(
        &self,
        identity: Option<&Identity>,
        new_store: NewStore,
    ) -> Result<StoreWithOwner, ServiceError> {
        let admin = authz::require(identity, ADMIN, None)?;

        let owner = self
            .storage
            .users()
            .get_by_id(new_store.owner_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Store owner"))?;

        if owner.role != Role::StoreOwner {
            return Err(ServiceError::BadRequest(
                "Selected user is not a store owner".to_string(),
            ));
        }

        let store = insert_store(&self.storage, new_store).await?;
        tracing::info!(admin_id = %admin.id, store_id = %store.id, "Admin created store");

        Ok(StoreWithOwner {
            store,
            owner_name: owner.name,
            owner_email: owner.email,
        })
    }

    async fn list_stores(
        &self,
        identity: Option<&Identity>,
        listing: &StoreListing,
    ) -> Result<Vec<AdminStoreEntry>, ServiceError> {
        authz::require(identity, ADMIN, None)?;

        let stores = self.storage.stores().list(listing).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.store.id).collect();
        let mut stats = self.aggregator.stats_for_stores(&ids).await?;

        Ok(stores
            .into_iter()
            .map(|store| AdminStoreEntry {
                stats: stats
                    .remove(&store.store.id)
                    .unwrap_or_else(|| StoreStats::from_breakdown(StarBreakdown::default())),
                store,
            })
            .collect())
    }
}
