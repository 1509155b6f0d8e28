//! Init config command handler

use std::path::Path;

use crate::config::Config;

pub fn cmd_init_config(path: &Path) -> anyhow::Result<()> {
    if Config::create_default_if_missing(path)? {
        println!("✓ Config file created at {}", path.display());
        println!("Edit it and run `storerate serve`.");
    } else {
        println!("Config file already exists at {}", path.display());
    }
    Ok(())
}
