//! Expense commands - list and add

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use rust_decimal::Decimal;
use splitmacha_core::domain::{CreateExpenseRequest, ExpenseStatus, SplitMethod};

use crate::output;
use super::get_context;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List all expenses
    List {
        /// Include soft-deleted expenses (shown by default; this flag hides them)
        #[arg(long)]
        hide_deleted: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a new expense, split equally
    Add {
        /// Group id
        group_id: String,
        /// What the expense was for
        description: String,
        /// Amount, e.g. 420.50
        amount: String,
        /// ISO 4217 currency code
        #[arg(long, default_value = "INR")]
        currency: String,
        /// Expense category
        #[arg(long, default_value = "General")]
        category: String,
        /// User id of who paid
        #[arg(long)]
        paid_by: String,
        /// User ids sharing the expense
        #[arg(long, value_delimiter = ',')]
        split_among: Vec<String>,
        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: ExpenseCommands) -> Result<()> {
    match command {
        ExpenseCommands::List { hide_deleted, json } => list(hide_deleted, json).await,
        ExpenseCommands::Add {
            group_id,
            description,
            amount,
            currency,
            category,
            paid_by,
            split_among,
            date,
            json,
        } => {
            add(
                group_id,
                description,
                amount,
                currency,
                category,
                paid_by,
                split_among,
                date,
                json,
            )
            .await
        }
    }
}

async fn list(hide_deleted: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut expenses = ctx.expenses.list().await?;

    // The backend returns records as stored; filtering is a display choice
    if hide_deleted {
        expenses.retain(|e| e.status != ExpenseStatus::Deleted);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Group", "Description", "Amount", "Paid by", "Date", "Status"]);
    for expense in &expenses {
        table.add_row(vec![
            expense.id.clone(),
            expense.group_name.clone(),
            expense.description.clone(),
            format!("{} {}", expense.amount, expense.currency),
            expense.paid_by_name.clone(),
            expense.expense_date.to_string(),
            format!("{:?}", expense.status).to_uppercase(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn add(
    group_id: String,
    description: String,
    amount: String,
    currency: String,
    category: String,
    paid_by: String,
    split_among: Vec<String>,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let amount: Decimal = amount
        .parse()
        .with_context(|| format!("Invalid amount: {}", amount))?;

    let ctx = get_context()?;
    let expense = ctx
        .expenses
        .create(&CreateExpenseRequest {
            group_id,
            description,
            amount,
            currency,
            category,
            paid_by,
            split_method: SplitMethod::Equal,
            split_among,
            split_details: None,
            expense_date: date.unwrap_or_else(|| Utc::now().date_naive()),
            notes: None,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expense)?);
        return Ok(());
    }
    output::success(&format!(
        "Recorded '{}' for {} {} in {}",
        expense.description, expense.amount, expense.currency, expense.group_name
    ));
    Ok(())
}
