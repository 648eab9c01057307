//! Expense domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an expense is divided among participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
    Shares,
}

/// Expense lifecycle state
///
/// Deletion is soft: records keep `Deleted` status instead of being removed.
/// Listings do NOT filter on this field; callers decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Active,
    Deleted,
}

/// A shared expense recorded against a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    pub category: String,
    pub category_icon: String,
    /// User id of who paid
    pub paid_by: String,
    pub paid_by_name: String,
    #[serde(default)]
    pub paid_by_avatar: Option<String>,
    pub split_method: SplitMethod,
    /// User ids sharing the expense
    pub split_among: Vec<String>,
    pub split_details: Vec<SplitDetail>,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    pub status: ExpenseStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-participant share of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitDetail {
    pub user_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub percentage: f64,
}

/// Request body for POST /expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub group_id: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub paid_by: String,
    pub split_method: SplitMethod,
    pub split_among: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_details: Option<Vec<SplitDetail>>,
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
