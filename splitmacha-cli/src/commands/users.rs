//! User commands - list and search

use anyhow::Result;
use splitmacha_core::User;

use crate::output;
use super::get_context;

fn print_users(users: &[User], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Email", "Currency", "Active"]);
    for user in users {
        table.add_row(vec![
            user.id.clone(),
            user.name.clone(),
            user.email.clone(),
            user.preferred_currency.clone(),
            if user.is_active { "yes".into() } else { "no".into() },
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub async fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let users = ctx.users.list().await?;
    print_users(&users, json)
}

pub async fn search(query: String, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let users = ctx.users.search(&query).await?;
    if users.is_empty() && !json {
        output::info(&format!("No users matching '{}'", query));
        return Ok(());
    }
    print_users(&users, json)
}
