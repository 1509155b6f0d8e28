use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use std::collections::HashMap;

use crate::db::now_timestamp;
use crate::domain::stats::StarBreakdown;
use crate::domain::{RatingId, Stars, StoreId, UserId};
use crate::entities::{prelude::*, ratings, stores, users};
use crate::models::{Rating, RatingDetail};

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a rating. A second row for the same `(user, store)` pair is
    /// rejected by the unique index and surfaces as a unique violation.
    pub async fn create(
        &self,
        user_id: UserId,
        store_id: StoreId,
        stars: Stars,
        comment: String,
    ) -> Result<Rating> {
        let now = now_timestamp();
        let active = ratings::ActiveModel {
            user_id: Set(user_id.value()),
            store_id: Set(store_id.value()),
            rating: Set(i32::from(stars.value())),
            comment: Set(comment),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert rating")?;

        Ok(Rating::from(model))
    }

    pub async fn get_by_id(&self, id: RatingId) -> Result<Option<Rating>> {
        let rating = Ratings::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query rating by ID")?;

        Ok(rating.map(Rating::from))
    }

    pub async fn find_for(&self, user_id: UserId, store_id: StoreId) -> Result<Option<Rating>> {
        let rating = Ratings::find()
            .filter(ratings::Column::UserId.eq(user_id.value()))
            .filter(ratings::Column::StoreId.eq(store_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query existing rating")?;

        Ok(rating.map(Rating::from))
    }

    /// The caller's own rating on each of `store_ids`, keyed by store.
    pub async fn by_user_for_stores(
        &self,
        user_id: UserId,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, Rating>> {
        if store_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Ratings::find()
            .filter(ratings::Column::UserId.eq(user_id.value()))
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().map(StoreId::value)))
            .all(&self.conn)
            .await
            .context("Failed to query user ratings for stores")?;

        Ok(rows
            .into_iter()
            .map(|model| (StoreId::new(model.store_id), Rating::from(model)))
            .collect())
    }

    pub async fn update(
        &self,
        id: RatingId,
        stars: Stars,
        comment: String,
    ) -> Result<Option<Rating>> {
        let Some(model) = Ratings::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query rating for update")?
        else {
            return Ok(None);
        };

        let mut active: ratings::ActiveModel = model.into();
        active.rating = Set(i32::from(stars.value()));
        active.comment = Set(comment);
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update rating")?;

        Ok(Some(Rating::from(model)))
    }

    pub async fn delete(&self, id: RatingId) -> Result<bool> {
        let result = Ratings::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete rating")?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Aggregation sources: grouped star counts read fresh on every call
    // ========================================================================

    pub async fn star_counts(&self, store_id: StoreId) -> Result<StarBreakdown> {
        let rows: Vec<(i32, i64)> = Ratings::find()
            .select_only()
            .column(ratings::Column::Rating)
            .column_as(ratings::Column::Id.count(), "count")
            .filter(ratings::Column::StoreId.eq(store_id.value()))
            .group_by(ratings::Column::Rating)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count ratings for store")?;

        Ok(StarBreakdown::from_counts(rows))
    }

    /// Star counts for several stores at once. Stores without ratings are
    /// absent from the map.
    pub async fn star_counts_by_store(
        &self,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, StarBreakdown>> {
        if store_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i32, i64)> = Ratings::find()
            .select_only()
            .column(ratings::Column::StoreId)
            .column(ratings::Column::Rating)
            .column_as(ratings::Column::Id.count(), "count")
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().map(StoreId::value)))
            .group_by(ratings::Column::StoreId)
            .group_by(ratings::Column::Rating)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count ratings by store")?;

        Ok(fold_grouped(rows)
            .into_iter()
            .map(|(id, breakdown)| (StoreId::new(id), breakdown))
            .collect())
    }

    /// Star counts across every store owned by each of `owner_ids`.
    pub async fn star_counts_by_owner(
        &self,
        owner_ids: &[UserId],
    ) -> Result<HashMap<UserId, StarBreakdown>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i32, i64)> = Ratings::find()
            .select_only()
            .column(stores::Column::OwnerId)
            .column(ratings::Column::Rating)
            .column_as(ratings::Column::Id.count(), "count")
            .join(JoinType::InnerJoin, ratings::Relation::Store.def())
            .filter(stores::Column::OwnerId.is_in(owner_ids.iter().map(UserId::value)))
            .group_by(stores::Column::OwnerId)
            .group_by(ratings::Column::Rating)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count ratings by owner")?;

        Ok(fold_grouped(rows)
            .into_iter()
            .map(|(id, breakdown)| (UserId::new(id), breakdown))
            .collect())
    }

    /// Histogram over every rating on the platform.
    pub async fn platform_star_counts(&self) -> Result<StarBreakdown> {
        let rows: Vec<(i32, i64)> = Ratings::find()
            .select_only()
            .column(ratings::Column::Rating)
            .column_as(ratings::Column::Id.count(), "count")
            .group_by(ratings::Column::Rating)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count platform ratings")?;

        Ok(StarBreakdown::from_counts(rows))
    }

    pub async fn count(&self) -> Result<u64> {
        Ratings::find()
            .count(&self.conn)
            .await
            .context("Failed to count ratings")
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        Ratings::find()
            .filter(ratings::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("Failed to count recent ratings")
    }

    // ========================================================================
    // Joined views
    // ========================================================================

    pub async fn detail(&self, id: RatingId) -> Result<Option<RatingDetail>> {
        let row = with_names(Ratings::find())
            .filter(ratings::Column::Id.eq(id.value()))
            .into_model::<RatingDetailRow>()
            .one(&self.conn)
            .await
            .context("Failed to query rating detail")?;

        Ok(row.map(RatingDetail::from))
    }

    /// Ratings on any of `store_ids`, newest first, optionally capped.
    pub async fn details_for_stores(
        &self,
        store_ids: &[StoreId],
        limit: Option<u64>,
    ) -> Result<Vec<RatingDetail>> {
        if store_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = with_names(Ratings::find())
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().map(StoreId::value)))
            .order_by_desc(ratings::Column::CreatedAt)
            .order_by_desc(ratings::Column::Id)
            .limit(limit)
            .into_model::<RatingDetailRow>()
            .all(&self.conn)
            .await
            .context("Failed to query ratings for stores")?;

        Ok(rows.into_iter().map(RatingDetail::from).collect())
    }

    pub async fn details_by_user(&self, user_id: UserId) -> Result<Vec<RatingDetail>> {
        let rows = with_names(Ratings::find())
            .filter(ratings::Column::UserId.eq(user_id.value()))
            .order_by_desc(ratings::Column::CreatedAt)
            .order_by_desc(ratings::Column::Id)
            .into_model::<RatingDetailRow>()
            .all(&self.conn)
            .await
            .context("Failed to query ratings by user")?;

        Ok(rows.into_iter().map(RatingDetail::from).collect())
    }
}

fn fold_grouped(rows: Vec<(i32, i32, i64)>) -> HashMap<i32, StarBreakdown> {
    let mut grouped: HashMap<i32, Vec<(i32, i64)>> = HashMap::new();
    for (key, value, count) in rows {
        grouped.entry(key).or_default().push((value, count));
    }

    grouped
        .into_iter()
        .map(|(key, counts)| (key, StarBreakdown::from_counts(counts)))
        .collect()
}

fn with_names(query: Select<Ratings>) -> Select<Ratings> {
    query
        .column_as(users::Column::Name, "user_name")
        .column_as(users::Column::Email, "user_email")
        .column_as(stores::Column::Name, "store_name")
        .join(JoinType::InnerJoin, ratings::Relation::User.def())
        .join(JoinType::InnerJoin, ratings::Relation::Store.def())
}

#[derive(Debug, Clone, FromQueryResult)]
struct RatingDetailRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    rating: i32,
    comment: String,
    created_at: String,
    updated_at: String,
    user_name: String,
    user_email: String,
    store_name: String,
}

impl From<RatingDetailRow> for RatingDetail {
    fn from(row: RatingDetailRow) -> Self {
        Self {
            rating: Rating {
                id: RatingId::new(row.id),
                user_id: UserId::new(row.user_id),
                store_id: StoreId::new(row.store_id),
                rating: row.rating,
                comment: row.comment,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user_name: row.user_name,
            user_email: row.user_email,
            store_name: row.store_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_grouped_keeps_keys_apart() {
        let grouped = fold_grouped(vec![(1, 5, 2), (1, 3, 1), (2, 1, 4)]);
        assert_eq!(grouped[&1].total(), 3);
        assert_eq!(grouped[&1].five_star, 2);
        assert_eq!(grouped[&2].one_star, 4);
        assert!(!grouped.contains_key(&3));
    }
}
