//! Translates a [`Listing`] into `SeaORM` query clauses.
//!
//! Filter fragments are only ever bound as `LIKE` parameters and the sort
//! column comes from a closed enum, so nothing the caller typed becomes SQL
//! text.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Order, QueryFilter, QueryOrder};

use crate::domain::listing::{
    FilterField, Listing, SortKey, SortOrder, StoreField, StoreSortKey, UserField, UserSortKey,
    like_pattern,
};
use crate::entities::{stores, users};

/// `LOWER(column) LIKE '%fragment%' ESCAPE '\'`
fn contains_ci<C: ColumnTrait>(column: C, fragment: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(like_pattern(fragment)).escape('\\'))
}

const fn to_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Applies the ASCII filters (AND) and the resolved sort. `tiebreak` keeps
/// rows with equal sort values in a stable order.
///
/// SQLite folds case for ASCII only, so filters with other characters are
/// left to [`Listing::retain_matching`] once the rows are loaded.
pub fn apply<Q, C, F, K>(
    mut query: Q,
    listing: &Listing<F, K>,
    filter_column: impl Fn(F) -> C,
    sort_column: impl Fn(K) -> C,
    tiebreak: C,
) -> Q
where
    Q: QueryFilter + QueryOrder,
    C: ColumnTrait,
    F: FilterField,
    K: SortKey,
{
    for filter in listing.filters.iter().filter(|f| f.is_ascii()) {
        query = query.filter(contains_ci(filter_column(filter.field), &filter.fragment));
    }

    let order = to_order(listing.order);
    query
        .order_by(sort_column(listing.sort_by), order.clone())
        .order_by(tiebreak, order)
}

#[must_use]
pub const fn user_filter_column(field: UserField) -> users::Column {
    match field {
        UserField::Name => users::Column::Name,
        UserField::Email => users::Column::Email,
        UserField::Address => users::Column::Address,
        UserField::Role => users::Column::Role,
    }
}

#[must_use]
pub const fn user_sort_column(key: UserSortKey) -> users::Column {
    match key {
        UserSortKey::Name => users::Column::Name,
        UserSortKey::Email => users::Column::Email,
        UserSortKey::Role => users::Column::Role,
        UserSortKey::CreatedAt => users::Column::CreatedAt,
    }
}

#[must_use]
pub const fn store_filter_column(field: StoreField) -> stores::Column {
    match field {
        StoreField::Name => stores::Column::Name,
        StoreField::Email => stores::Column::Email,
        StoreField::Address => stores::Column::Address,
    }
}

#[must_use]
pub const fn store_sort_column(key: StoreSortKey) -> stores::Column {
    match key {
        StoreSortKey::Name => stores::Column::Name,
        StoreSortKey::Email => stores::Column::Email,
        StoreSortKey::Address => stores::Column::Address,
        StoreSortKey::CreatedAt => stores::Column::CreatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{ListingParams, StoreListing, UserListing};
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    #[test]
    fn test_filters_are_bound_not_interpolated() {
        let listing = UserListing::from_params(&ListingParams {
            name: Some("anna'; DROP TABLE users; --".to_string()),
            ..ListingParams::default()
        });
        let query = apply(
            users::Entity::find(),
            &listing,
            user_filter_column,
            user_sort_column,
            users::Column::Id,
        );
        let stmt = query.build(DbBackend::Sqlite);
        assert!(!stmt.sql.contains("DROP TABLE"));
        assert!(stmt.sql.contains("LIKE"));
        assert!(stmt.sql.contains("ORDER BY \"users\".\"created_at\" DESC"));
    }

    #[test]
    fn test_non_ascii_filter_left_out_of_sql() {
        let listing = StoreListing::from_params(&ListingParams {
            name: Some("école".to_string()),
            address: Some("street".to_string()),
            ..ListingParams::default()
        });
        let query = apply(
            stores::Entity::find(),
            &listing,
            store_filter_column,
            store_sort_column,
            stores::Column::Id,
        );
        let sql = query.build(DbBackend::Sqlite).to_string();
        assert_eq!(sql.matches("LIKE").count(), 1);
        assert!(sql.contains("\"stores\".\"address\""));
        assert!(!sql.contains("cole"));
    }

    #[test]
    fn test_store_sort_uses_allow_listed_column() {
        let listing = StoreListing::from_params(&ListingParams {
            sort_by: Some("address".to_string()),
            sort_order: Some("asc".to_string()),
            ..ListingParams::default()
        });
        let query = apply(
            stores::Entity::find(),
            &listing,
            store_filter_column,
            store_sort_column,
            stores::Column::Id,
        );
        let sql = query.build(DbBackend::Sqlite).to_string();
        assert!(sql.contains("ORDER BY \"stores\".\"address\" ASC, \"stores\".\"id\" ASC"));
    }
}
