//! Friend domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Friend request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Direction of the outstanding balance with a friend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceStatus {
    /// The current user owes the friend
    Owe,
    /// The friend owes the current user
    Owed,
    Settled,
}

/// A friendship edge with a denormalized running balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub user_id: String,
    pub friend_id: String,
    pub friend_name: String,
    pub friend_email: String,
    #[serde(default)]
    pub friend_avatar: Option<String>,
    pub status: FriendStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub balance_status: BalanceStatus,
    /// Ids of groups both users belong to
    pub shared_groups: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friend_wire_shape() {
        let json = serde_json::json!({
            "id": "friend-1",
            "userId": "user-1",
            "friendId": "user-2",
            "friendName": "Arjun",
            "friendEmail": "arjun@example.com",
            "status": "ACCEPTED",
            "balance": 350.0,
            "balanceStatus": "OWED",
            "sharedGroups": ["group-1"],
            "createdAt": "2025-01-01T00:00:00Z",
            "acceptedAt": "2025-01-02T00:00:00Z"
        });
        let friend: Friend = serde_json::from_value(json).unwrap();
        assert_eq!(friend.status, FriendStatus::Accepted);
        assert_eq!(friend.balance_status, BalanceStatus::Owed);
        assert!(friend.rejected_at.is_none());
    }
}
