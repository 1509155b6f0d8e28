use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::listing::Sorting;
use crate::domain::stats::{StarBreakdown, StoreStats};
use crate::domain::{RatingId, Role, StoreId, UserId};
use crate::models::{Rating, RatingDetail, Store, StoreWithOwner, User};
use crate::services::FieldError;

/// Envelope around every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::failure(message, None)
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: "Validation failed".to_string(),
            data: None,
            errors: Some(errors),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope<U> {
    pub user: U,
}

// ============================================================================
// Stores
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StoreDto {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Store> for StoreDto {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreEnvelope<S> {
    pub store: S,
}

#[derive(Debug, Serialize)]
pub struct StoreRef {
    pub id: StoreId,
    pub name: String,
}

impl From<&Store> for StoreRef {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
        }
    }
}

/// `average_rating` and `total_ratings` without the histogram.
#[derive(Debug, Serialize)]
pub struct RatingInfo {
    pub average_rating: String,
    pub total_ratings: u64,
}

impl From<&StoreStats> for RatingInfo {
    fn from(stats: &StoreStats) -> Self {
        Self {
            average_rating: stats.average_rating.clone(),
            total_ratings: stats.total_ratings,
        }
    }
}

/// A store with its owner's name, as shown in store listings.
#[derive(Debug, Serialize)]
pub struct OwnedStoreDto {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub created_at: String,
}

impl From<StoreWithOwner> for OwnedStoreDto {
    fn from(entry: StoreWithOwner) -> Self {
        let StoreWithOwner {
            store, owner_name, ..
        } = entry;
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            owner_name,
            created_at: store.created_at,
        }
    }
}

/// Listing payload shared by the public and admin listings.
#[derive(Debug, Serialize)]
pub struct ListingPage<T> {
    #[serde(flatten)]
    pub items: T,
    pub total: usize,
    pub filters_applied: BTreeMap<&'static str, String>,
    pub sorting: Sorting,
}

// ============================================================================
// Ratings
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RatingDto {
    pub id: RatingId,
    pub store_id: StoreId,
    pub user_id: UserId,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Rating> for RatingDto {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            store_id: rating.store_id,
            user_id: rating.user_id,
            rating: rating.rating,
            comment: rating.comment,
            created_at: rating.created_at,
            updated_at: rating.updated_at,
        }
    }
}

/// The caller's earlier rating, as echoed on a duplicate submission and in
/// the store listing.
#[derive(Debug, Serialize)]
pub struct OwnRatingDto {
    pub id: RatingId,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
}

impl From<&Rating> for OwnRatingDto {
    fn from(rating: &Rating) -> Self {
        Self {
            id: rating.id,
            rating: rating.rating,
            comment: rating.comment.clone(),
            created_at: rating.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingDetailDto {
    pub id: RatingId,
    pub rating: i32,
    pub comment: String,
    pub user_id: UserId,
    pub user_name: String,
    pub store_id: StoreId,
    pub store_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RatingDetail> for RatingDetailDto {
    fn from(detail: RatingDetail) -> Self {
        let RatingDetail {
            rating,
            user_name,
            store_name,
            ..
        } = detail;
        Self {
            id: rating.id,
            rating: rating.rating,
            comment: rating.comment,
            user_id: rating.user_id,
            user_name,
            store_id: rating.store_id,
            store_name,
            created_at: rating.created_at,
            updated_at: rating.updated_at,
        }
    }
}

/// A rating as seen by the owner of the rated store.
#[derive(Debug, Serialize)]
pub struct RaterDto {
    pub rating_id: RatingId,
    pub user_name: String,
    pub user_email: String,
    pub rating: i32,
    pub comment: String,
    pub store_id: StoreId,
    pub store_name: String,
    pub created_at: String,
}

impl From<RatingDetail> for RaterDto {
    fn from(detail: RatingDetail) -> Self {
        Self {
            rating_id: detail.rating.id,
            user_name: detail.user_name,
            user_email: detail.user_email,
            rating: detail.rating.rating,
            comment: detail.rating.comment,
            store_id: detail.rating.store_id,
            store_name: detail.store_name,
            created_at: detail.rating.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub average_rating: String,
    pub total_ratings: u64,
    pub star_breakdown: StarBreakdown,
}

impl From<StoreStats> for StatsDto {
    fn from(stats: StoreStats) -> Self {
        Self {
            average_rating: stats.average_rating,
            total_ratings: stats.total_ratings,
            star_breakdown: stats.star_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_envelope_shape() {
        let body = ApiResponse::validation(vec![FieldError::new("email", "Valid email required")]);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["errors"][0]["field"], "email");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_success_envelope_carries_data() {
        let body = ApiResponse::success("ok", serde_json::json!({ "total": 2 }));
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["total"], 2);
        assert!(json.get("errors").is_none());
    }
}
