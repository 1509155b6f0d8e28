pub mod error;
pub use error::{FieldError, ServiceError};

pub mod aggregation;
pub use aggregation::RatingAggregator;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthService, AuthSession};
pub use auth_service_impl::SeaOrmAuthService;

pub mod store_service;
pub mod store_service_impl;
pub use store_service::{StoreDetail, StoreDraft, StoreListingEntry, StoreService};
pub use store_service_impl::SeaOrmStoreService;

pub mod rating_service;
pub mod rating_service_impl;
pub use rating_service::{DeletedRating, RatingService, RatingWithStats, StoreRatings};
pub use rating_service_impl::SeaOrmRatingService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{AdminService, AdminStoreEntry, UserDetails, UserSummary};
pub use admin_service_impl::SeaOrmAdminService;

pub mod owner_service;
pub mod owner_service_impl;
pub use owner_service::{OwnerDashboard, OwnerService, OwnerStoreStats, StoreRaters};
pub use owner_service_impl::SeaOrmOwnerService;
