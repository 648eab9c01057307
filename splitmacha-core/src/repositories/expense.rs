//! Expense repository

use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{CreateExpenseRequest, Expense};

/// Typed façade over the expense endpoints
///
/// Listings are returned as stored, including soft-deleted records;
/// filtering on `status` is the caller's decision.
pub struct ExpenseRepository {
    api: Arc<ApiClient>,
}

impl ExpenseRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/expenses
    pub async fn list(&self) -> Result<Vec<Expense>> {
        self.api.get("/api/v1/expenses").await
    }

    /// POST /api/v1/expenses
    pub async fn create(&self, request: &CreateExpenseRequest) -> Result<Expense> {
        self.api.post("/api/v1/expenses", request).await
    }
}
