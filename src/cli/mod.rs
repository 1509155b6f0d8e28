//! CLI module - Command-line interface for storerate
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// storerate - Store rating service
/// Users rate stores, owners watch their feedback, admins run the platform
#[derive(Parser)]
#[command(name = "storerate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to the usual search locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,

    /// Create an account with any role; the only way to create the first admin
    CreateUser {
        /// Display name (20-60 characters)
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        address: String,
        /// One of: user, store_owner, admin
        #[arg(long, default_value = "user")]
        role: String,
    },

    /// Print platform statistics as JSON
    Stats,
}

pub use commands::*;
