pub use super::ratings::Entity as Ratings;
pub use super::stores::Entity as Stores;
pub use super::users::Entity as Users;
