//! Friend repository

use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::Friend;

/// Typed façade over the friend endpoints
pub struct FriendRepository {
    api: Arc<ApiClient>,
}

impl FriendRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/friends
    pub async fn list(&self) -> Result<Vec<Friend>> {
        self.api.get("/api/v1/friends").await
    }
}
