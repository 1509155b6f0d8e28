mod create_user;
mod init_config;
mod stats;

pub use create_user::{CreateUserArgs, cmd_create_user};
pub use init_config::cmd_init_config;
pub use stats::cmd_stats;
