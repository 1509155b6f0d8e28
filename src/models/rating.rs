use serde::Serialize;

use crate::domain::{RatingId, StoreId, UserId};
use crate::entities::ratings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ratings::Model> for Rating {
    fn from(model: ratings::Model) -> Self {
        Self {
            id: RatingId::new(model.id),
            user_id: UserId::new(model.user_id),
            store_id: StoreId::new(model.store_id),
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A rating joined with the rater's and the store's names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingDetail {
    #[serde(flatten)]
    pub rating: Rating,
    pub user_name: String,
    pub user_email: String,
    pub store_name: String,
}
