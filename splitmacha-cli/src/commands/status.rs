//! Status command - backend health and session overview

use anyhow::Result;
use colored::Colorize;

use crate::output;
use super::get_context;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let health = ctx.system.health().await?;
    ctx.session_service.check_session().await?;
    let snapshot = ctx.session_service.current();

    if json {
        let summary = serde_json::json!({
            "backend": if ctx.is_mock() { "mock" } else { "real" },
            "baseUrl": ctx.api.base_url(),
            "health": health,
            "isAuthenticated": snapshot.is_authenticated(),
            "user": snapshot.user,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "SplitMacha Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec![
        "Backend",
        if ctx.is_mock() { "mock (local)" } else { "real" },
    ]);
    table.add_row(vec!["Base URL", ctx.api.base_url()]);
    table.add_row(vec!["Health", &health.status]);
    table.add_row(vec!["Message", &health.message]);
    match &snapshot.user {
        Some(user) => {
            table.add_row(vec!["Logged in as", &format!("{} <{}>", user.name, user.email)]);
        }
        None => {
            table.add_row(vec!["Logged in as", "-"]);
        }
    }
    println!("{}", table);

    if !snapshot.is_authenticated() {
        output::info("Run `sm login` to sign in");
    }
    Ok(())
}
