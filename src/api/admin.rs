use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::{AppJson, AppPath, AppQuery, Caller};
use super::validation::{
    Validator, validate_address, validate_email, validate_name, validate_password, validate_role,
    validate_store_name,
};
use super::{
    ApiError, ApiResponse, AppState, ListingPage, OwnedStoreDto, StoreEnvelope, UserDto,
    UserEnvelope,
};
use crate::domain::authz::ADMIN_ONLY;
use crate::domain::listing::{ListingParams, StoreListing, UserListing};
use crate::domain::stats::PlatformStats;
use crate::domain::{Role, StoreId, UserId};
use crate::models::{NewStore, NewUser};
use crate::services::{AdminStoreEntry, UserDetails, UserSummary};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(alias = "ownerId")]
    pub owner_id: i32,
}

#[derive(Serialize)]
pub struct DashboardDto {
    pub dashboard: PlatformStats,
}

#[derive(Serialize)]
pub struct UserListItem {
    #[serde(flatten)]
    pub user: UserDto,
    /// Only present for store owners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<String>,
}

impl From<UserSummary> for UserListItem {
    fn from(summary: UserSummary) -> Self {
        let is_owner = summary.user.role == Role::StoreOwner;
        Self {
            user: summary.user.into(),
            average_rating: is_owner
                .then(|| summary.average_rating.unwrap_or_else(|| "0.0".to_string())),
        }
    }
}

#[derive(Serialize)]
pub struct UserList {
    pub users: Vec<UserListItem>,
}

#[derive(Serialize)]
pub struct OwnedStoreStats {
    pub store_id: StoreId,
    pub store_name: String,
    pub average_rating: String,
    pub total_ratings: u64,
}

#[derive(Serialize)]
pub struct UserDetailsDto {
    #[serde(flatten)]
    pub user: UserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<OwnedStoreStats>>,
}

impl From<UserDetails> for UserDetailsDto {
    fn from(details: UserDetails) -> Self {
        Self {
            user: details.user.into(),
            stores: details.stores.map(|stores| {
                stores
                    .into_iter()
                    .map(|entry| OwnedStoreStats {
                        store_id: entry.store.id,
                        store_name: entry.store.name,
                        average_rating: entry.stats.average_rating,
                        total_ratings: entry.stats.total_ratings,
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Serialize)]
pub struct AdminStoreItem {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub created_at: String,
    pub rating: String,
    pub total_ratings: u64,
}

impl From<AdminStoreEntry> for AdminStoreItem {
    fn from(entry: AdminStoreEntry) -> Self {
        let store = entry.store.store;
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            owner_name: entry.store.owner_name,
            created_at: store.created_at,
            rating: entry.stats.average_rating,
            total_ratings: entry.stats.total_ratings,
        }
    }
}

#[derive(Serialize)]
pub struct AdminStoreList {
    pub stores: Vec<AdminStoreItem>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let stats = state.admin_service().dashboard(caller.identity()).await?;

    Ok(Json(ApiResponse::success(
        "Dashboard data retrieved successfully",
        DashboardDto { dashboard: stats },
    )))
}

/// POST /admin/users/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserEnvelope<UserDto>>>), ApiError> {
    caller.with_role(ADMIN_ONLY)?;

    let mut v = Validator::new();
    v.check("name", validate_name(&payload.name));
    v.check("email", validate_email(payload.email.trim()));
    v.check("password", validate_password(&payload.password));
    v.check("address", validate_address(&payload.address));
    let role = v.check("role", validate_role(&payload.role));
    v.finish()?;
    let role = role.ok_or_else(|| {
        ApiError::validation("role", "Role must be one of: admin, user, store_owner")
    })?;

    let user = state
        .admin_service()
        .create_user(
            caller.identity(),
            NewUser {
                name: payload.name,
                email: payload.email.trim().to_string(),
                password: payload.password,
                address: payload.address,
                role,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User created successfully",
            UserEnvelope { user: user.into() },
        )),
    ))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppQuery(params): AppQuery<ListingParams>,
) -> Result<Json<ApiResponse<ListingPage<UserList>>>, ApiError> {
    let listing = UserListing::from_params(&params);

    let users: Vec<UserListItem> = state
        .admin_service()
        .list_users(caller.identity(), &listing)
        .await?
        .into_iter()
        .map(UserListItem::from)
        .collect();

    Ok(Json(ApiResponse::success(
        "Users retrieved successfully",
        ListingPage {
            total: users.len(),
            items: UserList { users },
            filters_applied: listing.filters_applied(),
            sorting: listing.sorting(),
        },
    )))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<UserEnvelope<UserDetailsDto>>>, ApiError> {
    let details = state
        .admin_service()
        .user_details(caller.identity(), UserId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(
        "User details retrieved successfully",
        UserEnvelope {
            user: details.into(),
        },
    )))
}

/// POST /admin/stores/create
/// The named owner must exist and hold the `store_owner` role.
pub async fn create_store(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(payload): AppJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoreEnvelope<OwnedStoreDto>>>), ApiError> {
    caller.with_role(ADMIN_ONLY)?;

    let mut v = Validator::new();
    v.check("name", validate_store_name(&payload.name));
    v.check("email", validate_email(payload.email.trim()));
    v.check("address", validate_address(&payload.address));
    v.finish()?;

    let store = state
        .admin_service()
        .create_store(
            caller.identity(),
            NewStore {
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_string(),
                address: payload.address,
                owner_id: UserId::new(payload.owner_id),
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

/// GET /admin/stores
pub async fn list_stores(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppQuery(params): AppQuery<ListingParams>,
) -> Result<Json<ApiResponse<ListingPage<AdminStoreList>>>, ApiError> {
    let listing = StoreListing::from_params(&params);

    let stores: Vec<AdminStoreItem> = state
        .admin_service()
        .list_stores(caller.identity(), &listing)
        .await?
        .into_iter()
        .map(AdminStoreItem::from)
        .collect();

    Ok(Json(ApiResponse::success(
        "Stores retrieved successfully",
        ListingPage {
            total: stores.len(),
            items: AdminStoreList { stores },
            filters_applied: listing.filters_applied(),
            sorting: listing.sorting(),
        },
    )))
}
