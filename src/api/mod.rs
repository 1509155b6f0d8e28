use axum::{
    Router,
    http::{HeaderValue, Uri},
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Storage;
use crate::services::{AdminService, AuthService, OwnerService, RatingService, StoreService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod extract;
mod health;
mod observability;
mod ratings;
mod store_owner;
mod stores;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.shared.storage
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn store_service(&self) -> &Arc<dyn StoreService> {
        &self.shared.store_service
    }

    #[must_use]
    pub fn rating_service(&self) -> &Arc<dyn RatingService> {
        &self.shared.rating_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }

    #[must_use]
    pub fn owner_service(&self) -> &Arc<dyn OwnerService> {
        &self.shared.owner_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(observability::get_metrics))
        .merge(auth_routes())
        .merge(store_routes())
        .merge(rating_routes())
        .merge(admin_routes())
        .merge(store_owner_routes())
        .route_layer(middleware::from_fn(observability::route_label_middleware))
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::identity_middleware,
        ))
        .layer(session_layer)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/change-password", put(auth::change_password))
}

fn store_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stores/create", post(stores::create_store))
        .route("/stores/all", get(stores::list_stores))
        .route("/stores/my-stores", get(stores::my_stores))
        .route(
            "/stores/{id}",
            get(stores::get_store)
                .put(stores::update_store)
                .delete(stores::delete_store),
        )
}

fn rating_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ratings/submit", post(ratings::submit_rating))
        .route("/ratings/store/{store_id}", get(ratings::store_ratings))
        .route("/ratings/my-ratings", get(ratings::my_ratings))
        .route(
            "/ratings/{id}",
            get(ratings::get_rating)
                .put(ratings::update_rating)
                .delete(ratings::delete_rating),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users/create", post(admin::create_user))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", get(admin::get_user))
        .route("/admin/stores/create", post(admin::create_store))
        .route("/admin/stores", get(admin::list_stores))
}

fn store_owner_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/store-owner/dashboard", get(store_owner::dashboard))
        .route("/store-owner/ratings/users", get(store_owner::all_raters))
        .route(
            "/store-owner/ratings/users/{store_id}",
            get(store_owner::store_raters),
        )
        .route(
            "/store-owner/store/{store_id}/stats",
            get(store_owner::store_stats),
        )
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}
