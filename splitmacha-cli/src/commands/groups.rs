//! Group commands - list and create

use anyhow::Result;
use clap::Subcommand;
use splitmacha_core::domain::CreateGroupRequest;

use crate::output;
use super::get_context;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// List all groups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new group
    New {
        /// Group name
        name: String,
        /// Member user ids
        #[arg(long, value_delimiter = ',')]
        members: Vec<String>,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: GroupCommands) -> Result<()> {
    match command {
        GroupCommands::List { json } => list(json).await,
        GroupCommands::New {
            name,
            members,
            description,
            json,
        } => create(name, members, description, json).await,
    }
}

async fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let groups = ctx.groups.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Members", "Total", "Currency"]);
    for group in &groups {
        table.add_row(vec![
            group.id.clone(),
            group.name.clone(),
            group.members.len().to_string(),
            group.total_expenses.to_string(),
            group.currency.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn create(
    name: String,
    members: Vec<String>,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let group = ctx
        .groups
        .create(&CreateGroupRequest {
            name,
            description,
            avatar_url: None,
            members,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&group)?);
        return Ok(());
    }
    output::success(&format!("Created group '{}' ({})", group.name, group.id));
    Ok(())
}
