use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::{AppJson, AppPath, Caller};
use super::validation::{Validator, validate_rating};
use super::{ApiError, ApiResponse, AppState, RatingDetailDto, RatingDto, StatsDto, StoreRef};
use crate::domain::{RatingId, Stars, StoreId};
use crate::services::{DeletedRating, RatingWithStats};

const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Deserialize)]
pub struct SubmitRatingRequest {
    #[serde(alias = "storeId")]
    pub store_id: i32,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct RatingWithStatsDto {
    pub rating: RatingDto,
    pub store_stats: StatsDto,
}

impl From<RatingWithStats> for RatingWithStatsDto {
    fn from(result: RatingWithStats) -> Self {
        Self {
            rating: result.rating.into(),
            store_stats: result.store_stats.into(),
        }
    }
}

#[derive(Serialize)]
pub struct DeletedRatingSummary {
    pub id: RatingId,
    pub rating: i32,
    pub store_id: StoreId,
    pub store_name: String,
}

#[derive(Serialize)]
pub struct DeletedRatingDto {
    pub deleted_rating: DeletedRatingSummary,
    pub updated_store_stats: StatsDto,
}

impl From<DeletedRating> for DeletedRatingDto {
    fn from(deleted: DeletedRating) -> Self {
        Self {
            deleted_rating: DeletedRatingSummary {
                id: deleted.rating.id,
                rating: deleted.rating.rating,
                store_id: deleted.rating.store_id,
                store_name: deleted.store_name,
            },
            updated_store_stats: deleted.store_stats.into(),
        }
    }
}

#[derive(Serialize)]
pub struct StoreRatingsDto {
    pub store_info: StoreRef,
    pub statistics: StatsDto,
    pub ratings: Vec<RatingDetailDto>,
}

#[derive(Serialize)]
pub struct MyRatingsDto {
    pub ratings: Vec<RatingDetailDto>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct RatingEnvelope {
    pub rating: RatingDetailDto,
}

fn check_rating_input(rating: i64, comment: Option<&str>) -> Result<Stars, ApiError> {
    let mut v = Validator::new();
    let stars = v.check("rating", validate_rating(rating));
    if let Some(comment) = comment {
        v.check(
            "comment",
            if comment.chars().count() > MAX_COMMENT_CHARS {
                Err(format!("Comment must be at most {MAX_COMMENT_CHARS} characters"))
            } else {
                Ok(())
            },
        );
    }
    v.finish()?;
    stars.ok_or_else(|| ApiError::validation("rating", "Rating must be a number between 1 and 5"))
}

/// POST /ratings/submit
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(payload): AppJson<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RatingWithStatsDto>>), ApiError> {
    caller.authenticated()?;
    let stars = check_rating_input(payload.rating, payload.comment.as_deref())?;

    let result = state
        .rating_service()
        .submit(
            caller.identity(),
            StoreId::new(payload.store_id),
            stars,
            payload.comment.unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Rating submitted successfully",
            result.into(),
        )),
    ))
}

/// GET /ratings/store/{store_id}
pub async fn store_ratings(
    State(state): State<Arc<AppState>>,
    AppPath(store_id): AppPath<i32>,
) -> Result<Json<ApiResponse<StoreRatingsDto>>, ApiError> {
    let result = state
        .rating_service()
        .for_store(StoreId::new(store_id))
        .await?;

    Ok(Json(ApiResponse::success(
        "Store ratings retrieved successfully",
        StoreRatingsDto {
            store_info: StoreRef::from(&result.store),
            statistics: result.statistics.into(),
            ratings: result.ratings.into_iter().map(Into::into).collect(),
        },
    )))
}

/// GET /ratings/my-ratings
pub async fn my_ratings(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<MyRatingsDto>>, ApiError> {
    let ratings: Vec<RatingDetailDto> = state
        .rating_service()
        .mine(caller.identity())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::success(
        "Your ratings retrieved successfully",
        MyRatingsDto {
            total: ratings.len(),
            ratings,
        },
    )))
}

/// GET /ratings/{id}
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<RatingEnvelope>>, ApiError> {
    let detail = state.rating_service().get(RatingId::new(id)).await?;

    Ok(Json(ApiResponse::success(
        "Rating retrieved successfully",
        RatingEnvelope {
            rating: detail.into(),
        },
    )))
}

/// PUT /ratings/{id}
pub async fn update_rating(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateRatingRequest>,
) -> Result<Json<ApiResponse<RatingWithStatsDto>>, ApiError> {
    caller.authenticated()?;
    let stars = check_rating_input(payload.rating, payload.comment.as_deref())?;

    let result = state
        .rating_service()
        .update(
            caller.identity(),
            RatingId::new(id),
            stars,
            payload.comment.unwrap_or_default(),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        "Rating updated successfully",
        result.into(),
    )))
}

/// DELETE /ratings/{id}
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<DeletedRatingDto>>, ApiError> {
    let deleted = state
        .rating_service()
        .delete(caller.identity(), RatingId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(
        "Rating deleted successfully",
        deleted.into(),
    )))
}
