use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::{AppJson, AppPath, AppQuery, Caller};
use super::validation::{Validator, validate_address, validate_email, validate_store_name};
use super::{
    ApiError, ApiResponse, AppState, ListingPage, OwnRatingDto, RatingInfo, StatsDto, StoreDto,
    StoreEnvelope,
};
use crate::domain::authz::STORE_OWNER_ONLY;
use crate::domain::listing::{ListingParams, StoreListing};
use crate::domain::{StoreId, UserId};
use crate::models::StoreChanges;
use crate::services::{StoreDetail, StoreDraft, StoreListingEntry};

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
}

#[derive(Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct StoreListItem {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_name: String,
    pub created_at: String,
    pub rating_info: RatingInfo,
    /// `null` when the caller is anonymous or has not rated the store.
    pub user_rating: Option<OwnRatingDto>,
}

impl From<StoreListingEntry> for StoreListItem {
    fn from(entry: StoreListingEntry) -> Self {
        let rating_info = RatingInfo::from(&entry.stats);
        let user_rating = entry.user_rating.as_ref().map(OwnRatingDto::from);
        let store = entry.store.store;
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_name: entry.store.owner_name,
            created_at: store.created_at,
            rating_info,
            user_rating,
        }
    }
}

#[derive(Serialize)]
pub struct StoreList<T> {
    pub stores: Vec<T>,
}

#[derive(Serialize)]
pub struct StoreDetailDto {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub owner_email: String,
    pub created_at: String,
    pub updated_at: String,
    pub rating_info: StatsDto,
}

impl From<StoreDetail> for StoreDetailDto {
    fn from(detail: StoreDetail) -> Self {
        let owner = detail.store;
        let store = owner.store;
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            owner_name: owner.owner_name,
            owner_email: owner.owner_email,
            created_at: store.created_at,
            updated_at: store.updated_at,
            rating_info: detail.stats.into(),
        }
    }
}

#[derive(Serialize)]
pub struct OwnedStores {
    pub stores: Vec<StoreDto>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct DeletedStore {
    pub id: StoreId,
    pub name: String,
}

/// POST /stores/create
pub async fn create_store(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(payload): AppJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoreEnvelope<StoreDto>>>), ApiError> {
    caller.with_role(STORE_OWNER_ONLY)?;

    let mut v = Validator::new();
    v.check("name", validate_store_name(&payload.name));
    v.check("email", validate_email(payload.email.trim()));
    v.check("address", validate_address(&payload.address));
    v.finish()?;

    let store = state
        .store_service()
        .create(
            caller.identity(),
            StoreDraft {
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_string(),
                address: payload.address,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Store created successfully",
            StoreEnvelope {
                store: store.into(),
            },
        )),
    ))
}

/// GET /stores/all
pub async fn list_stores(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppQuery(params): AppQuery<ListingParams>,
) -> Result<Json<ApiResponse<ListingPage<StoreList<StoreListItem>>>>, ApiError> {
    let listing = StoreListing::from_params(&params);

    let stores: Vec<StoreListItem> = state
        .store_service()
        .list(caller.identity(), &listing)
        .await?
        .into_iter()
        .map(StoreListItem::from)
        .collect();

    Ok(Json(ApiResponse::success(
        "Stores retrieved successfully",
        ListingPage {
            total: stores.len(),
            items: StoreList { stores },
            filters_applied: listing.filters_applied(),
            sorting: listing.sorting(),
        },
    )))
}

/// GET /stores/{id}
pub async fn get_store(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<StoreEnvelope<StoreDetailDto>>>, ApiError> {
    let detail = state.store_service().get(StoreId::new(id)).await?;

    Ok(Json(ApiResponse::success(
        "Store retrieved successfully",
        StoreEnvelope {
            store: detail.into(),
        },
    )))
}

/// GET /stores/my-stores
pub async fn my_stores(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<OwnedStores>>, ApiError> {
    let stores: Vec<StoreDto> = state
        .store_service()
        .my_stores(caller.identity())
        .await?
        .into_iter()
        .map(StoreDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        "Stores retrieved successfully",
        OwnedStores {
            total: stores.len(),
            stores,
        },
    )))
}

/// PUT /stores/{id}
pub async fn update_store(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateStoreRequest>,
) -> Result<Json<ApiResponse<StoreEnvelope<StoreDto>>>, ApiError> {
    caller.authenticated()?;

    let mut v = Validator::new();
    if let Some(name) = &payload.name {
        v.check("name", validate_store_name(name));
    }
    if let Some(email) = &payload.email {
        v.check("email", validate_email(email.trim()));
    }
    if let Some(address) = &payload.address {
        v.check("address", validate_address(address));
    }
    v.finish()?;

    let changes = StoreChanges {
        name: payload.name.map(|name| name.trim().to_string()),
        email: payload.email.map(|email| email.trim().to_string()),
        address: payload.address,
    };

    let store = state
        .store_service()
        .update(caller.identity(), StoreId::new(id), changes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Store updated successfully",
        StoreEnvelope {
            store: store.into(),
        },
    )))
}

/// DELETE /stores/{id}
/// Removes the store together with its ratings.
pub async fn delete_store(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<StoreEnvelope<DeletedStore>>>, ApiError> {
    let store = state
        .store_service()
        .delete(caller.identity(), StoreId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(
        "Store deleted successfully",
        StoreEnvelope {
            store: DeletedStore {
                id: store.id,
                name: store.name,
            },
        },
    )))
}
