//! Session service - single source of truth for "who is logged in"
//!
//! The only writer of the session store. All session-mutating operations are
//! serialized through one async mutex so a login racing a logout cannot
//! interleave. State is published as immutable snapshots through a watch
//! channel; there is no global singleton to observe.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::sync::{watch, Mutex};

use crate::domain::result::{Error, Result};
use crate::domain::{Session, User};
use crate::ports::SessionStore;
use crate::repositories::auth::{AuthRepository, LoginRequest, RegisterRequest};
use crate::repositories::UserRepository;
use crate::services::logging::{LogEvent, LoggingService};

/// Minimum accepted password length (client-side check)
const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"))
}

/// Lowercase and trim an email address before it goes on the wire
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Observable auth state
///
/// `is_authenticated` is always derived from user presence - it is never a
/// separately stored flag that could drift from the user field.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub error: Option<String>,
}

impl AuthSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// The auth session manager
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    auth: AuthRepository,
    users: UserRepository,
    logger: Option<Arc<LoggingService>>,
    /// Single-writer guard over every session mutation
    write_lock: Mutex<()>,
    state: watch::Sender<AuthSnapshot>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        auth: AuthRepository,
        users: UserRepository,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Self {
            store,
            auth,
            users,
            logger,
            write_lock: Mutex::new(()),
            state,
        }
    }

    /// Current state snapshot
    pub fn current(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Derived from user presence, recomputed on every call
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Clear the last error message
    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Check authentication on process start
    ///
    /// Restores the session by fetching the real profile for the stored user
    /// id. Any storage read failure or profile fetch failure clears the store
    /// and reports no session.
    pub async fn check_session(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let session = match self.store.load().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.state.send_modify(|s| s.user = None);
                return Ok(false);
            }
            Err(_) => {
                let _ = self.store.clear().await;
                self.state.send_modify(|s| s.user = None);
                self.log(LogEvent::new("session_restore_failed").with_error("storage"));
                return Ok(false);
            }
        };

        match self.users.get_by_id(&session.user_id).await {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.error = None;
                });
                self.log(LogEvent::new("session_restored"));
                Ok(true)
            }
            Err(e) => {
                let _ = self.store.clear().await;
                self.state.send_modify(|s| s.user = None);
                self.log(LogEvent::new("session_restore_failed").with_error(e.category()));
                Ok(false)
            }
        }
    }

    /// Login with email and password
    ///
    /// The email is normalized before it is sent. On success the session is
    /// persisted (both keys in one document) before the user becomes current;
    /// a persistence failure fails the login. On failure the error message is
    /// recorded in the observable state and any prior session is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let _guard = self.write_lock.lock().await;

        let normalized = normalize_email(email);
        let result = match validate_credentials(&normalized, password) {
            Ok(()) => self.login_inner(&normalized, password).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.error = None;
                });
                self.log(LogEvent::new("login_success"));
                Ok(user)
            }
            Err(e) => {
                self.state.send_modify(|s| s.error = Some(e.to_string()));
                self.log(LogEvent::new("login_failed").with_error(e.category()));
                Err(e)
            }
        }
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .auth
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.store
            .save(&Session::new(&response.token, &response.user.id))
            .await?;
        Ok(response.user)
    }

    /// Register a new account
    ///
    /// Same contract as `login`; a duplicate email surfaces as a conflict.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<User> {
        let _guard = self.write_lock.lock().await;

        let normalized = normalize_email(email);
        let result = match validate_registration(name, &normalized, password) {
            Ok(()) => self.register_inner(name, &normalized, password, phone).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.error = None;
                });
                self.log(LogEvent::new("register_success"));
                Ok(user)
            }
            Err(e) => {
                self.state.send_modify(|s| s.error = Some(e.to_string()));
                self.log(LogEvent::new("register_failed").with_error(e.category()));
                Err(e)
            }
        }
    }

    async fn register_inner(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<User> {
        let response = self
            .auth
            .register(&RegisterRequest {
                name: name.trim().to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone: phone.map(str::to_string),
            })
            .await?;

        self.store
            .save(&Session::new(&response.token, &response.user.id))
            .await?;
        Ok(response.user)
    }

    /// Sign out
    ///
    /// Local clearing is authoritative: the in-memory user is dropped and the
    /// store cleared even when remote invalidation fails, and clearing with no
    /// active session is a no-op success.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // Best-effort remote invalidation; never fails the caller
        if self.auth.logout().await.is_err() {
            self.log(LogEvent::new("logout_remote_failed"));
        }

        self.state.send_modify(|s| {
            s.user = None;
            s.error = None;
        });
        self.store.clear().await?;
        self.log(LogEvent::new("logout"));
        Ok(())
    }

    /// Re-fetch the profile of the logged-in user
    pub async fn refresh_user(&self) -> Result<Option<User>> {
        let _guard = self.write_lock.lock().await;

        if !self.state.borrow().is_authenticated() {
            return Ok(None);
        }

        match self.users.get_me().await {
            Ok(user) => {
                self.state.send_modify(|s| s.user = Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                // The client has already cleared the store on a 401
                if e.is_unauthorized() {
                    self.state.send_modify(|s| s.user = None);
                }
                Err(e)
            }
        }
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

/// Client-side checks, resolved before any request is dispatched
fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !email_regex().is_match(email) {
        return Err(Error::validation("Please enter a valid email address"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Name is required"));
    }
    validate_credentials(email, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  A@B.com "), "a@b.com");
        assert_eq!(normalize_email("you@example.com"), "you@example.com");
    }

    #[test]
    fn test_malformed_email_fails_validation() {
        assert!(validate_credentials("not-an-email", "secret1").is_err());
        assert!(validate_credentials("a@b", "secret1").is_err());
        assert!(validate_credentials("a b@c.com", "secret1").is_err());
        assert!(validate_credentials("a@b.com", "secret1").is_ok());
    }

    #[test]
    fn test_short_password_fails_validation() {
        let err = validate_credentials("a@b.com", "12345").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(validate_credentials("a@b.com", "123456").is_ok());
    }

    #[test]
    fn test_registration_requires_a_name() {
        assert!(validate_registration("  ", "a@b.com", "secret1").is_err());
        assert!(validate_registration("Priya", "a@b.com", "secret1").is_ok());
    }

    #[test]
    fn test_snapshot_authentication_is_derived_from_user() {
        let snapshot = AuthSnapshot::default();
        assert!(!snapshot.is_authenticated());
    }
}
