//! Auth commands - login, register, logout, whoami

use anyhow::{bail, Result};
use dialoguer::{Input, Password};

use crate::output;
use super::get_context;

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None if atty::is(atty::Stream::Stdin) => {
            Ok(Input::new().with_prompt("Email").interact_text()?)
        }
        None => bail!("Email required (pass it as an argument when not running interactively)"),
    }
}

fn prompt_password(password: Option<String>, confirm: bool) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None if atty::is(atty::Stream::Stdin) => {
            let mut prompt = Password::new().with_prompt("Password");
            if confirm {
                prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
            }
            Ok(prompt.interact()?)
        }
        None => bail!("Password required (pass --password when not running interactively)"),
    }
}

pub async fn login(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let email = prompt_email(email)?;
    let password = prompt_password(password, false)?;

    let user = ctx.session_service.login(&email, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }
    output::success(&format!("Logged in as {} <{}>", user.name, user.email));
    Ok(())
}

pub async fn register(
    name: String,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let email = prompt_email(email)?;
    let password = prompt_password(password, true)?;

    let user = ctx
        .session_service
        .register(&name, &email, &password, phone.as_deref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }
    output::success(&format!("Account created for {} <{}>", user.name, user.email));
    Ok(())
}

pub async fn logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.session_service.logout().await?;
    output::success("Logged out");
    Ok(())
}

pub async fn whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    ctx.session_service.check_session().await?;

    match ctx.session_service.current().user {
        Some(user) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.add_row(vec!["Name", &user.name]);
            table.add_row(vec!["Email", &user.email]);
            table.add_row(vec!["Currency", &user.preferred_currency]);
            table.add_row(vec!["User ID", &user.id]);
            println!("{}", table);
        }
        None => {
            output::info("Not logged in");
        }
    }
    Ok(())
}
