//! Group domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A group of people splitting expenses together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_by: String,
    /// Member user ids
    pub members: Vec<String>,
    #[serde(default)]
    pub member_details: Option<Vec<GroupMember>>,
    /// Running total of all expenses recorded in the group
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized member info carried on a group for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Request body for POST /groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_expenses_is_a_wire_number() {
        let json = serde_json::json!({
            "id": "group-1",
            "name": "Goa Trip",
            "createdBy": "user-1",
            "members": ["user-1", "user-2"],
            "totalExpenses": 1250.50,
            "currency": "INR",
            "isActive": true,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let group: Group = serde_json::from_value(json).unwrap();
        assert_eq!(group.total_expenses, Decimal::new(125050, 2));

        let back = serde_json::to_value(&group).unwrap();
        assert!(back["totalExpenses"].is_number());
    }
}
