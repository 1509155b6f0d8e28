pub mod rating;
pub mod store;
pub mod user;

pub use rating::{Rating, RatingDetail};
pub use store::{NewStore, Store, StoreChanges, StoreWithOwner};
pub use user::{NewUser, User};
