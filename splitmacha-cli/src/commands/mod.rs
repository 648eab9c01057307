//! CLI command implementations

pub mod auth;
pub mod expenses;
pub mod friends;
pub mod groups;
pub mod logs;
pub mod mock;
pub mod settlements;
pub mod status;
pub mod users;

use std::path::PathBuf;

use anyhow::{Context, Result};
use splitmacha_core::{EntryPoint, SplitmachaContext};

/// Get the app directory from environment or default
pub fn get_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SPLITMACHA_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".splitmacha")
    }
}

/// Get or create the SplitMacha context
pub fn get_context() -> Result<SplitmachaContext> {
    let app_dir = get_app_dir();

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;

    SplitmachaContext::new(&app_dir, EntryPoint::Cli)
}
