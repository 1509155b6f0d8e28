//! Filter and sort specifications for user and store listings.
//!
//! Raw query parameters are turned into a [`Listing`]: a list of
//! `(field, fragment)` pairs drawn from a fixed per-entity schema plus a sort
//! key taken from an allow-list. The storage layer maps these enums to columns
//! and binds fragments as parameters; no raw input ever reaches the query text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sort order. Only the literal `asc` selects ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

/// Query string accepted by every listing endpoint. Fields an entity does not
/// recognise are ignored by its schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "sort_by")]
    pub sort_by: Option<String>,
    #[serde(alias = "sort_order")]
    pub sort_order: Option<String>,
}

/// A filterable column of some entity.
pub trait FilterField: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn extract(self, params: &ListingParams) -> Option<&str>;
}

/// An allow-listed sort column of some entity. `Default` is the fallback.
pub trait SortKey: Copy + Default + Sized + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    #[must_use]
    fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|raw| Self::ALL.iter().copied().find(|key| key.name() == raw))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Address,
    Role,
}

impl FilterField for UserField {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Address, Self::Role];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Role => "role",
        }
    }

    fn extract(self, params: &ListingParams) -> Option<&str> {
        match self {
            Self::Name => params.name.as_deref(),
            Self::Email => params.email.as_deref(),
            Self::Address => params.address.as_deref(),
            Self::Role => params.role.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreField {
    Name,
    Email,
    Address,
}

impl FilterField for StoreField {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Address];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
        }
    }

    fn extract(self, params: &ListingParams) -> Option<&str> {
        match self {
            Self::Name => params.name.as_deref(),
            Self::Email => params.email.as_deref(),
            Self::Address => params.address.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortKey {
    Name,
    Email,
    Role,
    #[default]
    CreatedAt,
}

impl SortKey for UserSortKey {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Role, Self::CreatedAt];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSortKey {
    Name,
    Email,
    Address,
    #[default]
    CreatedAt,
}

impl SortKey for StoreSortKey {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Address, Self::CreatedAt];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::CreatedAt => "created_at",
        }
    }
}

/// One case-insensitive substring constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<F> {
    pub field: F,
    pub fragment: String,
}

impl<F> Filter<F> {
    /// Unicode-aware: `"école"` matches `"École Café"`.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        value
            .to_lowercase()
            .contains(&self.fragment.to_lowercase())
    }

    /// Whether SQLite's `LOWER`/`LIKE`, which only fold ASCII, can evaluate
    /// this filter exactly.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        self.fragment.is_ascii()
    }
}

/// Resolved listing request: AND of all filters, ordered by `sort_by`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<F, K> {
    pub filters: Vec<Filter<F>>,
    pub sort_by: K,
    pub order: SortOrder,
}

pub type UserListing = Listing<UserField, UserSortKey>;
pub type StoreListing = Listing<StoreField, StoreSortKey>;

impl<F: FilterField, K: SortKey> Default for Listing<F, K> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort_by: K::default(),
            order: SortOrder::default(),
        }
    }
}

impl<F: FilterField, K: SortKey> Listing<F, K> {
    /// Builds a listing from raw parameters. Empty fragments impose no
    /// constraint and an unknown `sortBy` falls back to the default key.
    #[must_use]
    pub fn from_params(params: &ListingParams) -> Self {
        let filters = F::ALL
            .iter()
            .filter_map(|&field| {
                field
                    .extract(params)
                    .filter(|fragment| !fragment.trim().is_empty())
                    .map(|fragment| Filter {
                        field,
                        fragment: fragment.to_string(),
                    })
            })
            .collect();

        Self {
            filters,
            sort_by: K::parse(params.sort_by.as_deref()),
            order: SortOrder::parse(params.sort_order.as_deref()),
        }
    }

    /// Drops rows that fail any filter. `value` reads a field off a row.
    pub fn retain_matching<T>(&self, rows: &mut Vec<T>, value: impl Fn(&T, F) -> &str) {
        if self.filters.is_empty() {
            return;
        }
        rows.retain(|row| self.filters.iter().all(|f| f.matches(value(row, f.field))));
    }

    #[must_use]
    pub fn filters_applied(&self) -> BTreeMap<&'static str, String> {
        self.filters
            .iter()
            .map(|f| (f.field.name(), f.fragment.clone()))
            .collect()
    }

    #[must_use]
    pub fn sorting(&self) -> Sorting {
        Sorting {
            sort_by: self.sort_by.name(),
            sort_order: self.order,
        }
    }
}

/// The sort actually applied, echoed back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sorting {
    pub sort_by: &'static str,
    pub sort_order: SortOrder,
}

/// Escapes `LIKE` wildcards so a fragment only ever matches literally.
#[must_use]
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ListingParams {
        ListingParams::default()
    }

    #[test]
    fn test_filter_folds_non_ascii_case() {
        let listing = StoreListing::from_params(&ListingParams {
            name: Some("école".to_string()),
            ..params()
        });
        let filter = &listing.filters[0];
        assert!(!filter.is_ascii());
        assert!(filter.matches("École Café"));
        assert!(filter.matches("ÉCOLE"));
        assert!(!filter.matches("Ecole"));

        let mut names = vec!["École Café", "Hardware Depot", "Petite ÉCOLE"];
        listing.retain_matching(&mut names, |name, _| *name);
        assert_eq!(names, vec!["École Café", "Petite ÉCOLE"]);
    }

    #[test]
    fn test_no_filters_gives_default_listing() {
        let listing = UserListing::from_params(&params());
        assert!(listing.filters.is_empty());
        assert_eq!(listing.sort_by, UserSortKey::CreatedAt);
        assert_eq!(listing.order, SortOrder::Desc);
    }

    #[test]
    fn test_only_supplied_fields_become_filters() {
        let listing = UserListing::from_params(&ListingParams {
            name: Some("anna".to_string()),
            role: Some("owner".to_string()),
            email: Some("   ".to_string()),
            ..params()
        });
        assert_eq!(
            listing.filters,
            vec![
                Filter {
                    field: UserField::Name,
                    fragment: "anna".to_string()
                },
                Filter {
                    field: UserField::Role,
                    fragment: "owner".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_store_schema_ignores_role() {
        let listing = StoreListing::from_params(&ListingParams {
            role: Some("admin".to_string()),
            address: Some("main".to_string()),
            ..params()
        });
        assert_eq!(listing.filters.len(), 1);
        assert_eq!(listing.filters[0].field, StoreField::Address);
    }

    #[test]
    fn test_sort_by_outside_allow_list_falls_back() {
        let listing = UserListing::from_params(&ListingParams {
            sort_by: Some("password; DROP TABLE users".to_string()),
            sort_order: Some("asc".to_string()),
            ..params()
        });
        assert_eq!(listing.sort_by, UserSortKey::CreatedAt);
        assert_eq!(listing.order, SortOrder::Asc);

        // address is sortable for stores but not for users
        let users = UserListing::from_params(&ListingParams {
            sort_by: Some("address".to_string()),
            ..params()
        });
        assert_eq!(users.sort_by, UserSortKey::CreatedAt);

        let stores = StoreListing::from_params(&ListingParams {
            sort_by: Some("address".to_string()),
            ..params()
        });
        assert_eq!(stores.sort_by, StoreSortKey::Address);
    }

    #[test]
    fn test_sort_order_is_binary() {
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Anna"), "%anna%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_echoes_applied_filters_and_sorting() {
        let listing = StoreListing::from_params(&ListingParams {
            name: Some("cafe".to_string()),
            sort_by: Some("name".to_string()),
            ..params()
        });
        assert_eq!(listing.filters_applied().get("name").map(String::as_str), Some("cafe"));
        let sorting = serde_json::to_value(listing.sorting()).unwrap();
        assert_eq!(sorting["sort_by"], "name");
        assert_eq!(sorting["sort_order"], "desc");
    }
}
