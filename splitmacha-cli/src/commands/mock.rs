//! Mock command - toggle the local mock backend

use anyhow::Result;
use splitmacha_core::config::Config;

use crate::output;
use super::get_app_dir;

pub fn enable(latency_ms: Option<u64>) -> Result<()> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir)?;

    let mut config = Config::load(&app_dir)?;
    config.enable_mock_mode();
    if let Some(latency_ms) = latency_ms {
        config.mock_latency_ms = latency_ms;
    }
    config.save(&app_dir)?;

    output::success(&format!(
        "Mock mode enabled ({}ms simulated latency)",
        config.mock_latency_ms
    ));
    output::info("All commands now run against a local seeded backend");
    Ok(())
}

pub fn disable() -> Result<()> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir)?;

    let mut config = Config::load(&app_dir)?;
    config.disable_mock_mode();
    config.save(&app_dir)?;

    output::warning("Mock mode disabled - commands hit the real backend");
    Ok(())
}
