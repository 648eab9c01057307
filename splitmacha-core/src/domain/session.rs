//! Session domain model

use serde::{Deserialize, Serialize};

/// The `{token, userId}` pair identifying the authenticated user on this device
///
/// At most one session is active per installed client. The two fields are
/// persisted as a single document so they can never be written partially.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_persisted_shape() {
        let session = Session::new("mock-token-user-1", "user-1");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["token"], "mock-token-user-1");
        assert_eq!(json["userId"], "user-1");
    }
}
