use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
};

use crate::db::{listing, now_timestamp};
use crate::domain::listing::{StoreField, StoreListing};
use crate::domain::{StoreId, UserId};
use crate::entities::{prelude::*, ratings, stores, users};
use crate::models::{NewStore, Store, StoreChanges, StoreWithOwner};

pub struct StoreRepository {
    conn: DatabaseConnection,
}

impl StoreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_store: NewStore) -> Result<Store> {
        let now = now_timestamp();
        let active = stores::ActiveModel {
            name: Set(new_store.name),
            email: Set(new_store.email),
            address: Set(new_store.address),
            owner_id: Set(new_store.owner_id.value()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert store")?;

        Ok(Store::from(model))
    }

    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>> {
        let store = Stores::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query store by ID")?;

        Ok(store.map(Store::from))
    }

    pub async fn get_with_owner(&self, id: StoreId) -> Result<Option<StoreWithOwner>> {
        let row = with_owner(Stores::find())
            .filter(stores::Column::Id.eq(id.value()))
            .into_model::<StoreOwnerRow>()
            .one(&self.conn)
            .await
            .context("Failed to query store with owner")?;

        Ok(row.map(StoreWithOwner::from))
    }

    /// Whether `email` belongs to a store other than `except`.
    pub async fn email_taken(&self, email: &str, except: Option<StoreId>) -> Result<bool> {
        let mut query = Stores::find().filter(stores::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(stores::Column::Id.ne(id.value()));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check store email")?;

        Ok(count > 0)
    }

    /// Stores whose `owner_id` is `owner`, newest first.
    pub async fn owned_by(&self, owner: UserId) -> Result<Vec<Store>> {
        let stores = Stores::find()
            .filter(stores::Column::OwnerId.eq(owner.value()))
            .order_by_desc(stores::Column::CreatedAt)
            .order_by_desc(stores::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query stores by owner")?;

        Ok(stores.into_iter().map(Store::from).collect())
    }

    pub async fn update(&self, id: StoreId, changes: StoreChanges) -> Result<Option<Store>> {
        let Some(model) = Stores::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query store for update")?
        else {
            return Ok(None);
        };

        let mut active: stores::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update store")?;

        Ok(Some(Store::from(model)))
    }

    /// Deletes the store and every rating on it in one transaction.
    pub async fn delete(&self, id: StoreId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Ratings::delete_many()
            .filter(ratings::Column::StoreId.eq(id.value()))
            .exec(&txn)
            .await
            .context("Failed to delete store ratings")?;

        let result = Stores::delete_by_id(id.value())
            .exec(&txn)
            .await
            .context("Failed to delete store")?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, listing: &StoreListing) -> Result<Vec<StoreWithOwner>> {
        let query = listing::apply(
            with_owner(Stores::find()),
            listing,
            listing::store_filter_column,
            listing::store_sort_column,
            stores::Column::Id,
        );

        let rows = query
            .into_model::<StoreOwnerRow>()
            .all(&self.conn)
            .await
            .context("Failed to list stores")?;

        let mut stores: Vec<StoreWithOwner> = rows.into_iter().map(StoreWithOwner::from).collect();
        listing.retain_matching(&mut stores, |row, field| match field {
            StoreField::Name => row.store.name.as_str(),
            StoreField::Email => row.store.email.as_str(),
            StoreField::Address => row.store.address.as_str(),
        });

        Ok(stores)
    }

    pub async fn count(&self) -> Result<u64> {
        Stores::find()
            .count(&self.conn)
            .await
            .context("Failed to count stores")
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        Stores::find()
            .filter(stores::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("Failed to count recent stores")
    }
}

fn with_owner(query: Select<Stores>) -> Select<Stores> {
    query
        .column_as(users::Column::Name, "owner_name")
        .column_as(users::Column::Email, "owner_email")
        .join(JoinType::InnerJoin, stores::Relation::Owner.def())
}

#[derive(Debug, Clone, FromQueryResult)]
struct StoreOwnerRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    owner_id: i32,
    created_at: String,
    updated_at: String,
    owner_name: String,
    owner_email: String,
}

impl From<StoreOwnerRow> for StoreWithOwner {
    fn from(row: StoreOwnerRow) -> Self {
        Self {
            store: Store {
                id: StoreId::new(row.id),
                name: row.name,
                email: row.email,
                address: row.address,
                owner_id: UserId::new(row.owner_id),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            owner_name: row.owner_name,
            owner_email: row.owner_email,
        }
    }
}
