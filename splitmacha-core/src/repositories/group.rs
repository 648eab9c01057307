//! Group repository

use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{CreateGroupRequest, Group};

/// Typed façade over the group endpoints
pub struct GroupRepository {
    api: Arc<ApiClient>,
}

impl GroupRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/groups
    pub async fn list(&self) -> Result<Vec<Group>> {
        self.api.get("/api/v1/groups").await
    }

    /// POST /api/v1/groups
    pub async fn create(&self, request: &CreateGroupRequest) -> Result<Group> {
        self.api.post("/api/v1/groups", request).await
    }
}
