//! Integration tests for the session lifecycle and the mock backend
//!
//! These tests drive the real stack end to end: SessionService ->
//! repositories -> ApiClient -> a live MockApiServer over TCP. Only the
//! session store varies (in-memory for failure injection, file-backed for
//! persistence checks).
//!
//! Run with: cargo test --test session_lifecycle -- --nocapture

use std::sync::Arc;

use tempfile::TempDir;

use splitmacha_core::adapters::api::ApiClient;
use splitmacha_core::adapters::mock_server::{MockApiServer, MockConfig};
use splitmacha_core::adapters::storage::MemorySessionStore;
use splitmacha_core::domain::result::Error;
use splitmacha_core::domain::{CreateGroupRequest, PaymentMethod, RecordSettlementRequest, Session};
use splitmacha_core::ports::SessionStore;
use splitmacha_core::repositories::{
    AuthRepository, ExpenseRepository, GroupRepository, SettlementRepository, SystemRepository,
    UserRepository,
};
use splitmacha_core::services::SessionService;
use splitmacha_core::{EntryPoint, SplitmachaContext};
use rust_decimal::Decimal;

// ============================================================================
// Test Helpers
// ============================================================================

fn quick_config() -> MockConfig {
    MockConfig {
        latency_ms: 0,
        ..Default::default()
    }
}

struct Harness {
    // Held so the backend stays up for the duration of the test
    server: MockApiServer,
    store: Arc<MemorySessionStore>,
    api: Arc<ApiClient>,
    service: SessionService,
}

fn harness() -> Harness {
    harness_with(quick_config())
}

fn harness_with(config: MockConfig) -> Harness {
    let server = MockApiServer::start(config).expect("mock server should start");
    let store = Arc::new(MemorySessionStore::new());
    let api = Arc::new(
        ApiClient::new(&server.base_url(), store.clone(), None).expect("client should build"),
    );
    let service = SessionService::new(
        store.clone(),
        AuthRepository::new(api.clone()),
        UserRepository::new(api.clone()),
        None,
    );
    Harness {
        server,
        store,
        api,
        service,
    }
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_against_seeded_email_returns_user_and_token() {
    let h = harness();

    let user = h.service.login("you@example.com", "any-password").await.unwrap();
    assert_eq!(user.email, "you@example.com");

    // Stored token matches the value the login call returned
    let session = h.store.load().await.unwrap().unwrap();
    assert!(!session.token.is_empty());
    assert_eq!(session.token, "mock-token-user-1");
    assert_eq!(session.user_id, user.id);

    assert!(h.service.is_authenticated());
    assert!(h.service.current().error.is_none());
}

#[tokio::test]
async fn test_login_lookup_is_case_and_whitespace_insensitive() {
    let h = harness();

    let user = h.service.login("  YOU@Example.COM ", "password1").await.unwrap();
    assert_eq!(user.email, "you@example.com");
    assert!(h.service.is_authenticated());
}

#[tokio::test]
async fn test_login_unknown_email_fails_with_not_found_naming_the_address() {
    let h = harness();

    let err = h
        .service
        .login("missing@nowhere.com", "password1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.to_string().contains("missing@nowhere.com"));

    assert!(!h.service.is_authenticated());
    // The failure left a displayable error in the observable state
    let snapshot = h.service.current();
    assert!(snapshot.error.as_deref().unwrap().contains("missing@nowhere.com"));
    // No session was persisted
    assert!(h.store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_failure_leaves_prior_session_untouched() {
    let h = harness();

    h.service.login("you@example.com", "password1").await.unwrap();
    let before = h.store.load().await.unwrap().unwrap();

    let err = h.service.login("missing@nowhere.com", "password1").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let after = h.store.load().await.unwrap().unwrap();
    assert_eq!(before, after);
    assert!(h.service.is_authenticated());
}

#[tokio::test]
async fn test_validation_fails_fast_before_any_request() {
    let h = harness();

    let err = h.service.login("not-an-email", "password1").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = h.service.login("you@example.com", "short").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(!h.service.is_authenticated());
    assert!(h.service.current().error.is_some());
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_creates_account_and_signs_in() {
    let h = harness();

    let user = h
        .service
        .register("Kiran Rao", "kiran@example.com", "secret123", Some("+91-98100-00000"))
        .await
        .unwrap();
    assert_eq!(user.email, "kiran@example.com");
    assert!(h.service.is_authenticated());

    let session = h.store.load().await.unwrap().unwrap();
    assert_eq!(session.user_id, user.id);

    let count = h.server.dataset().lock().unwrap().users.len();
    assert_eq!(count, 5);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts_without_creating_a_record() {
    let h = harness();

    let err = h
        .service
        .register("Imposter", "PRIYA@example.com", "secret123", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(!h.service.is_authenticated());

    let count = h.server.dataset().lock().unwrap().users.len();
    assert_eq!(count, 4, "the seeded users must be unchanged");
}

#[tokio::test]
async fn test_rapid_registrations_get_distinct_identifiers() {
    let h = harness();

    let a = h
        .service
        .register("First", "first@example.com", "secret123", None)
        .await
        .unwrap();
    let b = h
        .service
        .register("Second", "second@example.com", "secret123", None)
        .await
        .unwrap();
    assert_ne!(a.id, b.id);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_session_and_is_idempotent() {
    let h = harness();

    // Logout with no active session succeeds
    h.service.logout().await.unwrap();
    assert!(h.store.load().await.unwrap().is_none());

    h.service.login("you@example.com", "password1").await.unwrap();
    assert!(h.service.is_authenticated());

    h.service.logout().await.unwrap();
    assert!(!h.service.is_authenticated());
    assert!(h.store.load().await.unwrap().is_none());

    // And again
    h.service.logout().await.unwrap();
    assert!(h.store.load().await.unwrap().is_none());
}

// ============================================================================
// Session restore
// ============================================================================

#[tokio::test]
async fn test_check_session_restores_the_real_profile() {
    let h = harness();
    h.service.login("priya@example.com", "password1").await.unwrap();

    // A fresh service over the same store, as on process start
    let restored = SessionService::new(
        h.store.clone(),
        AuthRepository::new(h.api.clone()),
        UserRepository::new(h.api.clone()),
        None,
    );
    assert!(!restored.is_authenticated());

    assert!(restored.check_session().await.unwrap());
    let snapshot = restored.current();
    let user = snapshot.user.unwrap();
    // The real profile, not a placeholder
    assert_eq!(user.email, "priya@example.com");
    assert_eq!(user.name, "Priya Sharma");
}

#[tokio::test]
async fn test_check_session_without_stored_session_reports_none() {
    let h = harness();
    assert!(!h.service.check_session().await.unwrap());
    assert!(!h.service.is_authenticated());
}

#[tokio::test]
async fn test_check_session_clears_store_on_read_failure() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();

    h.store.set_fail_loads(true);
    assert!(!h.service.check_session().await.unwrap());
    assert!(!h.service.is_authenticated());

    h.store.set_fail_loads(false);
    assert!(h.store.load().await.unwrap().is_none(), "store must be cleared");
}

#[tokio::test]
async fn test_check_session_fails_the_session_when_profile_fetch_fails() {
    let h = harness();

    // A stored session pointing at a user the backend doesn't know
    h.store
        .save(&Session::new("mock-token-user-99", "user-99"))
        .await
        .unwrap();

    assert!(!h.service.check_session().await.unwrap());
    assert!(h.store.load().await.unwrap().is_none());
}

// ============================================================================
// Unauthorized side effect
// ============================================================================

#[tokio::test]
async fn test_401_clears_session_and_subsequent_check_reports_none() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();

    // Replace the stored token with one the backend rejects
    h.store
        .save(&Session::new("mock-token-forged", "user-1"))
        .await
        .unwrap();

    let err = h.service.refresh_user().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert!(!h.service.is_authenticated());

    // The forced side effect already wiped the store
    assert!(!h.service.check_session().await.unwrap());
    assert!(h.store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_fail_auth_backend_rejects_every_call() {
    let h = harness_with(MockConfig {
        latency_ms: 0,
        fail_auth: true,
    });

    let err = h.service.login("you@example.com", "password1").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert!(!h.service.is_authenticated());
}

// ============================================================================
// Repositories over the mock route table
// ============================================================================

#[tokio::test]
async fn test_user_routes() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();
    let users = UserRepository::new(h.api.clone());

    let me = users.get_me().await.unwrap();
    assert_eq!(me.id, "user-1");

    let by_id = users.get_by_id("user-3").await.unwrap();
    assert_eq!(by_id.name, "Arjun Patel");

    let by_email = users.get_by_email("MEERA@example.com").await.unwrap();
    assert_eq!(by_email.id, "user-4");

    let all = users.list().await.unwrap();
    assert_eq!(all.len(), 4);

    let found = users.search("priya").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "user-2");

    let err = users.get_by_id("user-404").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_update_profile_round_trip() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();
    let users = UserRepository::new(h.api.clone());

    let updated = users
        .update(
            "user-1",
            &splitmacha_core::domain::UpdateUserRequest {
                name: Some("You Renamed".into()),
                preferred_currency: Some("EUR".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "You Renamed");
    assert_eq!(updated.preferred_currency, "EUR");
    // Untouched fields survive
    assert_eq!(updated.email, "you@example.com");
}

#[tokio::test]
async fn test_group_and_expense_routes() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();

    let groups = GroupRepository::new(h.api.clone());
    let listed = groups.list().await.unwrap();
    assert_eq!(listed.len(), 2);

    let created = groups
        .create(&CreateGroupRequest {
            name: "Office Lunches".into(),
            description: None,
            avatar_url: None,
            members: vec!["user-1".into(), "user-2".into()],
        })
        .await
        .unwrap();
    assert!(created.id.starts_with("group-"));
    assert_eq!(created.created_by, "user-1");
    assert_eq!(created.total_expenses, Decimal::ZERO);

    let expenses = ExpenseRepository::new(h.api.clone());
    let listed = expenses.list().await.unwrap();
    // Soft-deleted records are returned as stored, not filtered
    assert!(listed
        .iter()
        .any(|e| e.status == splitmacha_core::domain::ExpenseStatus::Deleted));
}

#[tokio::test]
async fn test_settlement_recording() {
    let h = harness();
    h.service.login("you@example.com", "password1").await.unwrap();
    let settlements = SettlementRepository::new(h.api.clone());

    let recorded = settlements
        .record(&RecordSettlementRequest {
            group_id: "group-1".into(),
            from_user_id: "user-2".into(),
            to_user_id: "user-1".into(),
            amount: Decimal::new(35000, 2),
            currency: "INR".into(),
            payment_method: PaymentMethod::Upi,
            payment_reference: None,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(recorded.group_name, "Goa Trip");
    assert_eq!(recorded.from_user_name, "Priya Sharma");
    assert_eq!(
        recorded.status,
        splitmacha_core::domain::SettlementStatus::Completed
    );
    assert!(recorded.settled_at.is_some());

    let listed = settlements.list().await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_health_route_needs_no_session() {
    let h = harness();
    let system = SystemRepository::new(h.api.clone());
    let health = system.health().await.unwrap();
    assert_eq!(health.status, "UP");
    assert!(!health.message.is_empty());
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test]
async fn test_subscribers_observe_login_and_logout() {
    let h = harness();
    let mut rx = h.service.subscribe();

    h.service.login("you@example.com", "password1").await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_authenticated());

    h.service.logout().await.unwrap();
    rx.changed().await.unwrap();
    assert!(!rx.borrow_and_update().is_authenticated());
}

// ============================================================================
// Configurable latency
// ============================================================================

#[tokio::test]
async fn test_mock_latency_is_applied_uniformly() {
    let h = harness_with(MockConfig {
        latency_ms: 150,
        fail_auth: false,
    });

    let start = std::time::Instant::now();
    h.service.login("you@example.com", "password1").await.unwrap();
    assert!(start.elapsed() >= std::time::Duration::from_millis(150));
}

// ============================================================================
// Full context over a file-backed store
// ============================================================================

#[tokio::test]
async fn test_context_in_mock_mode_end_to_end() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"app": {"mockMode": true, "mockLatencyMs": 0}}"#,
    )
    .unwrap();

    let ctx = SplitmachaContext::new(dir.path(), EntryPoint::Cli).unwrap();
    assert!(ctx.is_mock());

    ctx.session_service
        .login("you@example.com", "password1")
        .await
        .unwrap();
    assert!(ctx.session_service.is_authenticated());

    // The session survives on disk for the next context
    let session = ctx.session_store.load().await.unwrap().unwrap();
    assert_eq!(session.user_id, "user-1");

    let health = ctx.system.health().await.unwrap();
    assert_eq!(health.status, "UP");

    let friends = ctx.friends.list().await.unwrap();
    assert_eq!(friends.len(), 2);
}

#[tokio::test]
async fn test_second_context_restores_session_from_disk() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"app": {"mockMode": true, "mockLatencyMs": 0}}"#,
    )
    .unwrap();

    {
        let ctx = SplitmachaContext::new(dir.path(), EntryPoint::Cli).unwrap();
        ctx.session_service
            .login("arjun@example.com", "password1")
            .await
            .unwrap();
    }

    // New process start: the stored session points at the same mock dataset
    let ctx = SplitmachaContext::new(dir.path(), EntryPoint::Cli).unwrap();
    assert!(ctx.session_service.check_session().await.unwrap());
    let user = ctx.session_service.current().user.unwrap();
    assert_eq!(user.email, "arjun@example.com");
}
