//! Friends command - list friends and balances

use anyhow::Result;

use crate::output;
use super::get_context;

pub async fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let friends = ctx.friends.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&friends)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Email", "Status", "Balance", "Direction"]);
    for friend in &friends {
        table.add_row(vec![
            friend.friend_name.clone(),
            friend.friend_email.clone(),
            format!("{:?}", friend.status).to_uppercase(),
            friend.balance.to_string(),
            format!("{:?}", friend.balance_status).to_uppercase(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
