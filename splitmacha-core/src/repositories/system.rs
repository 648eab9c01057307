//! System repository - backend health

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;

/// Response body for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed façade over the system endpoints
pub struct SystemRepository {
    api: Arc<ApiClient>,
}

impl SystemRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/health
    pub async fn health(&self) -> Result<HealthStatus> {
        self.api.get("/api/v1/health").await
    }
}
