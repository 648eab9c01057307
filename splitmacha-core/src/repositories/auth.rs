//! Auth repository - login, register, logout

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::User;

/// Request body for POST /auth/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for POST /auth/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Response body for both auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub message: String,
}

/// Typed façade over the auth endpoints
pub struct AuthRepository {
    api: Arc<ApiClient>,
}

impl AuthRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// POST /api/v1/auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.api.post("/api/v1/auth/login", request).await
    }

    /// POST /api/v1/auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.api.post("/api/v1/auth/register", request).await
    }

    /// Remote token invalidation placeholder. The backend has no logout
    /// endpoint; clearing local storage is what signs the device out.
    pub async fn logout(&self) -> Result<()> {
        Ok(())
    }
}
