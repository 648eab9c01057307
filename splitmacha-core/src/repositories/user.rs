//! User repository

use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{CreateUserRequest, UpdateUserRequest, User};

/// Typed façade over the user endpoints
pub struct UserRepository {
    api: Arc<ApiClient>,
}

impl UserRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// GET /api/v1/users/me
    pub async fn get_me(&self) -> Result<User> {
        self.api.get("/api/v1/users/me").await
    }

    /// GET /api/v1/users/:id
    pub async fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.api.get(&format!("/api/v1/users/{}", user_id)).await
    }

    /// GET /api/v1/users/email/:email
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.api
            .get(&format!("/api/v1/users/email/{}", email))
            .await
    }

    /// GET /api/v1/users
    pub async fn list(&self) -> Result<Vec<User>> {
        self.api.get("/api/v1/users").await
    }

    /// POST /api/v1/users
    pub async fn create(&self, request: &CreateUserRequest) -> Result<User> {
        self.api.post("/api/v1/users", request).await
    }

    /// PUT /api/v1/users/:id
    pub async fn update(&self, user_id: &str, request: &UpdateUserRequest) -> Result<User> {
        self.api
            .put(&format!("/api/v1/users/{}", user_id), request)
            .await
    }

    /// GET /api/v1/users/search?q=
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        self.api
            .get_query("/api/v1/users/search", &[("q", query)])
            .await
    }
}
