//! Logs command - show recent structured events

use anyhow::Result;
use chrono::{TimeZone, Utc};

use crate::output;
use super::get_context;

pub fn run(limit: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let entries = ctx.logger.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::info("No log entries yet");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Method", "Route", "Status", "Error"]);
    for entry in &entries {
        let time = Utc
            .timestamp_millis_opt(entry.ts_ms)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.ts_ms.to_string());
        table.add_row(vec![
            time,
            entry.event.event.clone(),
            entry.event.method.clone().unwrap_or_default(),
            entry.event.route.clone().unwrap_or_default(),
            entry
                .event
                .status
                .map(|s| s.to_string())
                .unwrap_or_default(),
            entry.event.error_category.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
