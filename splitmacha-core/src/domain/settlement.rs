//! Settlement domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment channel used to settle up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Upi,
    BankTransfer,
    Paytm,
    Phonepe,
    Gpay,
    Other,
}

/// Settlement lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Completed,
    Pending,
    Cancelled,
}

/// A repayment between two members of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub from_user_id: String,
    pub from_user_name: String,
    #[serde(default)]
    pub from_user_avatar: Option<String>,
    pub to_user_id: String,
    pub to_user_name: String,
    #[serde(default)]
    pub to_user_avatar: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: SettlementStatus,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /settlements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSettlementRequest {
    pub group_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_values() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::BankTransfer).unwrap(),
            serde_json::json!("BANK_TRANSFER")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::Upi).unwrap(),
            serde_json::json!("UPI")
        );
        let method: PaymentMethod = serde_json::from_value(serde_json::json!("PHONEPE")).unwrap();
        assert_eq!(method, PaymentMethod::Phonepe);
    }
}
