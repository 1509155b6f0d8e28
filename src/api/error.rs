use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use super::{ApiResponse, OwnRatingDto};
use crate::models::Rating;
use crate::services::{FieldError, ServiceError};

#[derive(Debug)]
pub enum ApiError {
    ValidationError(Vec<FieldError>),

    BadRequest(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    /// No route matched; carries the requested path.
    RouteNotFound(String),

    Conflict(String),

    DuplicateRating(Box<Rating>),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(errors) => {
                write!(f, "Validation error: {} invalid field(s)", errors.len())
            }
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::RouteNotFound(path) => write!(f, "Route {path} not found"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::DuplicateRating(rating) => {
                write!(f, "Conflict: rating {} already exists", rating.id)
            }
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct RouteNotFoundBody {
    path: String,
}

#[derive(Serialize)]
struct DuplicateRatingBody {
    existing_rating: OwnRatingDto,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::ValidationError(errors) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ApiResponse::validation(errors)),
                )
                    .into_response();
            }
            Self::RouteNotFound(path) => {
                let body = ApiResponse::failure(
                    format!("Route {path} not found"),
                    Some(RouteNotFoundBody { path }),
                );
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
            Self::DuplicateRating(rating) => {
                let body = ApiResponse::failure(
                    "You have already rated this store. Use update instead.",
                    Some(DuplicateRatingBody {
                        existing_rating: OwnRatingDto::from(rating.as_ref()),
                    }),
                );
                return (StatusCode::CONFLICT, Json(body)).into_response();
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => Self::ValidationError(errors),
            ServiceError::BadRequest(msg) => Self::BadRequest(msg),
            ServiceError::Unauthenticated(msg) => Self::Unauthorized(msg),
            ServiceError::Forbidden(msg) => Self::Forbidden(msg),
            ServiceError::NotFound(msg) => Self::NotFound(msg),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::DuplicateRating(rating) => Self::DuplicateRating(rating),
            ServiceError::Database(msg) => Self::DatabaseError(msg),
            ServiceError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError(vec![FieldError::new(field, message)])
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
