//! Settlement commands - list and record

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use rust_decimal::Decimal;
use splitmacha_core::domain::{PaymentMethod, RecordSettlementRequest};

use crate::output;
use super::get_context;

#[derive(Subcommand)]
pub enum SettlementCommands {
    /// List all settlements
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a repayment between two group members
    Record {
        /// Group id
        group_id: String,
        /// User id of who paid
        from: String,
        /// User id of who was paid
        to: String,
        /// Amount, e.g. 350.00
        amount: String,
        /// ISO 4217 currency code
        #[arg(long, default_value = "INR")]
        currency: String,
        /// Payment method (cash, upi, bank, paytm, phonepe, gpay, other)
        #[arg(long, default_value = "upi")]
        method: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_method(method: &str) -> Result<PaymentMethod> {
    Ok(match method.to_lowercase().as_str() {
        "cash" => PaymentMethod::Cash,
        "upi" => PaymentMethod::Upi,
        "bank" | "bank_transfer" => PaymentMethod::BankTransfer,
        "paytm" => PaymentMethod::Paytm,
        "phonepe" => PaymentMethod::Phonepe,
        "gpay" => PaymentMethod::Gpay,
        "other" => PaymentMethod::Other,
        other => bail!("Unknown payment method: {}", other),
    })
}

pub async fn run(command: SettlementCommands) -> Result<()> {
    match command {
        SettlementCommands::List { json } => list(json).await,
        SettlementCommands::Record {
            group_id,
            from,
            to,
            amount,
            currency,
            method,
            json,
        } => record(group_id, from, to, amount, currency, method, json).await,
    }
}

async fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let settlements = ctx.settlements.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settlements)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Group", "From", "To", "Amount", "Method", "Status"]);
    for settlement in &settlements {
        table.add_row(vec![
            settlement.id.clone(),
            settlement.group_name.clone(),
            settlement.from_user_name.clone(),
            settlement.to_user_name.clone(),
            format!("{} {}", settlement.amount, settlement.currency),
            format!("{:?}", settlement.payment_method).to_uppercase(),
            format!("{:?}", settlement.status).to_uppercase(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn record(
    group_id: String,
    from: String,
    to: String,
    amount: String,
    currency: String,
    method: String,
    json: bool,
) -> Result<()> {
    let amount: Decimal = amount
        .parse()
        .with_context(|| format!("Invalid amount: {}", amount))?;
    let payment_method = parse_method(&method)?;

    let ctx = get_context()?;
    let settlement = ctx
        .settlements
        .record(&RecordSettlementRequest {
            group_id,
            from_user_id: from,
            to_user_id: to,
            amount,
            currency,
            payment_method,
            payment_reference: None,
            notes: None,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settlement)?);
        return Ok(());
    }
    output::success(&format!(
        "{} paid {} {} {} in {}",
        settlement.from_user_name,
        settlement.to_user_name,
        settlement.amount,
        settlement.currency,
        settlement.group_name
    ));
    Ok(())
}
