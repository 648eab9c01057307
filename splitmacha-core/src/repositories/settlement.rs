//! Settlement repository

use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{RecordSettlementRequest, Settlement};

/// Typed façade over the settlement endpoints
pub struct SettlementRepository {
    api: Arc<ApiClient>,
}

impl SettlementRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/settlements
    pub async fn list(&self) -> Result<Vec<Settlement>> {
        self.api.get("/api/v1/settlements").await
    }

    /// POST /api/v1/settlements
    pub async fn record(&self, request: &RecordSettlementRequest) -> Result<Settlement> {
        self.api.post("/api/v1/settlements", request).await
    }
}
