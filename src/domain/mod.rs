//! Domain types for the store-rating platform.
//!
//! Entity identifiers use the Newtype pattern so a `StoreId` can never be
//! passed where a `UserId` is expected. The closed [`Role`] enum replaces
//! string comparisons on role names.

pub mod authz;
pub mod listing;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

entity_id!(
    /// Unique identifier of a User.
    ///
    /// ```rust
    /// use storerate::domain::UserId;
    ///
    /// let id = UserId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    UserId
);

entity_id!(
    /// Unique identifier of a Store.
    StoreId
);

entity_id!(
    /// Unique identifier of a Rating.
    RatingId
);

/// The three fixed roles a User can hold. Assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    StoreOwner,
    Admin,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::User, Self::StoreOwner, Self::Admin];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::StoreOwner => "store_owner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Role must be one of: admin, user, store_owner (got '{0}')")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// The decoded credential: the only facts about the caller the core relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

/// Rating value, guaranteed to lie within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn new(value: i64) -> Option<Self> {
        if value >= Self::MIN as i64 && value <= Self::MAX as i64 {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}
