//! SplitMacha API client
//!
//! Single choke point for outbound HTTP. Attaches the bearer token (read
//! fresh from the session store on every call, never cached in memory),
//! logs request/response events, and classifies failures into the fixed
//! error taxonomy. A 401 clears the stored session before the error is
//! returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::ports::SessionStore;
use crate::services::logging::{LogEvent, LoggingService};

/// Default production API URL
const PRODUCTION_URL: &str = "https://api.splitmacha.com";

/// Environment variable to override the API base URL.
/// Set this to point at a staging environment or a local mock server.
pub const BASE_URL_ENV: &str = "SPLITMACHA_API_BASE_URL";

/// Request timeout. Generous because there is exactly one attempt:
/// no retry, no backoff, no cancellation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed fallback when neither the server nor the transport supplied a message
const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Get the API base URL, checking the environment variable first
pub fn get_base_url() -> String {
    std::env::var(BASE_URL_ENV).unwrap_or_else(|_| PRODUCTION_URL.to_string())
}

/// Structured error body returned by the backend: `{error, message}`
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    #[allow(dead_code)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the SplitMacha backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    logger: Option<Arc<LoggingService>>,
}

impl ApiClient {
    /// Create a client against the given base URL
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        logger: Option<Arc<LoggingService>>,
    ) -> Result<Self> {
        url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            logger,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, &[], None::<&()>).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.request(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if !query.is_empty() {
            request = request.query(query);
        }

        // Token is read fresh from the store on every call so a logout or
        // session clear is picked up immediately (no stale in-memory copy).
        if let Ok(Some(session)) = self.store.load().await {
            request = request.bearer_auth(session.token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        self.log(LogEvent::new("api_request").with_route(method.as_str(), path));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = map_request_error(e);
                self.log(
                    LogEvent::new("api_error")
                        .with_route(method.as_str(), path)
                        .with_error(err.category()),
                );
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            self.log(
                LogEvent::new("api_response")
                    .with_route(method.as_str(), path)
                    .with_status(status.as_u16()),
            );
            return response
                .json::<T>()
                .await
                .map_err(|e| Error::Unknown(format!("Failed to parse response: {}", e)));
        }

        let body_text = response.text().await.unwrap_or_default();
        let err = classify_status(status, &body_text);

        // Unauthorized is the only category with a forced side effect:
        // the local session is cleared regardless of the calling screen.
        if err.is_unauthorized() {
            let _ = self.store.clear().await;
            self.log(LogEvent::new("session_cleared").with_error("unauthorized"));
        }

        self.log(
            LogEvent::new("api_error")
                .with_route(method.as_str(), path)
                .with_status(status.as_u16())
                .with_error(err.category()),
        );
        Err(err)
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

/// Map transport errors (no response received) to user-friendly messages
fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::network("Connection timed out after 30 seconds")
    } else if error.is_connect() {
        Error::network("Unable to connect to SplitMacha servers")
    } else {
        Error::network("Network error - no response received")
    }
}

/// Classify a non-success response purely from its status code
///
/// The display message is extracted preferentially from the structured
/// `{error, message}` body, falling back to the HTTP reason, falling back
/// to a fixed default. The category never depends on message text.
fn classify_status(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => DEFAULT_ERROR_MESSAGE.to_string(),
        });

    match status.as_u16() {
        401 => Error::Unauthorized(message),
        403 => Error::Forbidden(message),
        404 => Error::NotFound(message),
        409 => Error::Conflict(message),
        500..=599 => Error::Server(message),
        _ => Error::Unknown(message),
    }
}
