use std::sync::Arc;

use crate::config::Config;
use crate::db::Storage;
use crate::services::{
    AdminService, AuthService, OwnerService, RatingAggregator, RatingService, SeaOrmAdminService,
    SeaOrmAuthService, SeaOrmOwnerService, SeaOrmRatingService, SeaOrmStoreService, StoreService,
};

/// Services shared by every request handler and CLI command.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub storage: Storage,

    pub aggregator: RatingAggregator,

    pub auth_service: Arc<dyn AuthService>,

    pub store_service: Arc<dyn StoreService>,

    pub rating_service: Arc<dyn RatingService>,

    pub admin_service: Arc<dyn AdminService>,

    pub owner_service: Arc<dyn OwnerService>,
}

impl SharedState {
    /// Connects to the configured database (running migrations) and wires
    /// the services on top of it.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = Storage::connect(&config.general).await?;
        Ok(Self::with_storage(config, storage))
    }

    #[must_use]
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let aggregator = RatingAggregator::new(storage.clone(), config.ratings.clone());

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            storage.clone(),
            config.security.clone(),
        ));

        let store_service: Arc<dyn StoreService> = Arc::new(SeaOrmStoreService::new(
            storage.clone(),
            aggregator.clone(),
        ));

        let rating_service: Arc<dyn RatingService> = Arc::new(SeaOrmRatingService::new(
            storage.clone(),
            aggregator.clone(),
        ));

        let admin_service: Arc<dyn AdminService> = Arc::new(SeaOrmAdminService::new(
            storage.clone(),
            config.security.clone(),
            aggregator.clone(),
        ));

        let owner_service: Arc<dyn OwnerService> = Arc::new(SeaOrmOwnerService::new(
            storage.clone(),
            aggregator.clone(),
        ));

        Self {
            config: Arc::new(config),
            storage,
            aggregator,
            auth_service,
            store_service,
            rating_service,
            admin_service,
            owner_service,
        }
    }
}
