pub mod prelude;

pub mod ratings;
pub mod stores;
pub mod users;
