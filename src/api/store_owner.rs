use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::extract::{AppPath, Caller};
use super::{ApiError, ApiResponse, AppState, RaterDto, StatsDto, StoreRef};
use crate::domain::StoreId;
use crate::models::RatingDetail;
use crate::services::owner_service::{OwnerOverview, OwnerStoreSummary};
use crate::services::{OwnerDashboard, OwnerStoreStats, StoreRaters};

#[derive(Serialize)]
pub struct RecentRatingDto {
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
}

impl From<RatingDetail> for RecentRatingDto {
    fn from(detail: RatingDetail) -> Self {
        Self {
            user_name: detail.user_name,
            rating: detail.rating.rating,
            comment: detail.rating.comment,
            created_at: detail.rating.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct DashboardStoreDto {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub created_at: String,
    pub rating_stats: StatsDto,
    pub recent_ratings: Vec<RecentRatingDto>,
}

impl From<OwnerStoreSummary> for DashboardStoreDto {
    fn from(summary: OwnerStoreSummary) -> Self {
        let store = summary.store;
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            created_at: store.created_at,
            rating_stats: summary.rating_stats.into(),
            recent_ratings: summary.recent_ratings.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct DashboardDto {
    pub overview: OwnerOverview,
    pub stores: Vec<DashboardStoreDto>,
}

impl From<OwnerDashboard> for DashboardDto {
    fn from(dashboard: OwnerDashboard) -> Self {
        Self {
            overview: dashboard.overview,
            stores: dashboard.stores.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct RatersDto {
    pub users: Vec<RaterDto>,
    pub total: usize,
    pub stores_included: Vec<StoreRef>,
}

impl From<StoreRaters> for RatersDto {
    fn from(raters: StoreRaters) -> Self {
        Self {
            total: raters.ratings.len(),
            users: raters.ratings.into_iter().map(Into::into).collect(),
            stores_included: raters.stores_included.iter().map(StoreRef::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct StoreInfo {
    pub id: StoreId,
    pub name: String,
    pub address: String,
}

#[derive(Serialize)]
pub struct StoreStatsDto {
    pub store_info: StoreInfo,
    pub rating_summary: StatsDto,
    pub recent_ratings: Vec<RecentRatingDto>,
}

impl From<OwnerStoreStats> for StoreStatsDto {
    fn from(stats: OwnerStoreStats) -> Self {
        Self {
            store_info: StoreInfo {
                id: stats.store.id,
                name: stats.store.name,
                address: stats.store.address,
            },
            rating_summary: stats.rating_summary.into(),
            recent_ratings: stats.recent_ratings.into_iter().map(Into::into).collect(),
        }
    }
}

/// GET /store-owner/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let dashboard = state.owner_service().dashboard(caller.identity()).await?;

    Ok(Json(ApiResponse::success(
        "Store owner dashboard retrieved successfully",
        dashboard.into(),
    )))
}

/// GET /store-owner/ratings/users
pub async fn all_raters(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<RatersDto>>, ApiError> {
    let raters = state.owner_service().raters(caller.identity(), None).await?;

    Ok(Json(ApiResponse::success(
        "Users who rated your stores retrieved successfully",
        raters.into(),
    )))
}

/// GET /store-owner/ratings/users/{store_id}
pub async fn store_raters(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(store_id): AppPath<i32>,
) -> Result<Json<ApiResponse<RatersDto>>, ApiError> {
    let raters = state
        .owner_service()
        .raters(caller.identity(), Some(StoreId::new(store_id)))
        .await?;

    Ok(Json(ApiResponse::success(
        "Users who rated your store retrieved successfully",
        raters.into(),
    )))
}

/// GET /store-owner/store/{store_id}/stats
pub async fn store_stats(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(store_id): AppPath<i32>,
) -> Result<Json<ApiResponse<StoreStatsDto>>, ApiError> {
    let stats = state
        .owner_service()
        .store_stats(caller.identity(), StoreId::new(store_id))
        .await?;

    Ok(Json(ApiResponse::success(
        "Store statistics retrieved successfully",
        stats.into(),
    )))
}
