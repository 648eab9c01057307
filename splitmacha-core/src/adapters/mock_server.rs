//! Mock SplitMacha API server for development
//!
//! This module provides a mock HTTP server that simulates the SplitMacha
//! backend, allowing the app to be developed and exercised without a real
//! deployment. It answers the same route table the real backend would, over
//! seeded in-memory collections:
//!
//! - POST /api/v1/auth/login and /auth/register issue `mock-token-<userId>`
//! - GET/POST/PUT routes for users, groups, expenses, friends, settlements
//! - GET /api/v1/health
//!
//! Lookups are linear scans: login matches email case-insensitively after
//! trimming; get-by-id matches identifiers exactly. A "not found" returns a
//! structured `{error, message}` body with 404; a duplicate registration
//! returns 409. Every route is answered after the same configurable
//! artificial latency to simulate network delay.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use crate::adapters::id::prefixed_id;
use crate::domain::{
    BalanceStatus, CreateExpenseRequest, CreateGroupRequest, CreateUserRequest, Expense,
    ExpenseStatus, Friend, FriendStatus, Group, PaymentMethod, RecordSettlementRequest,
    Settlement, SettlementStatus, SplitDetail, SplitMethod, UpdateUserRequest, User,
};
use crate::repositories::auth::{LoginRequest, RegisterRequest};

/// Mock SplitMacha server for development and tests
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    data: Arc<Mutex<MockDataset>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Delay in milliseconds applied uniformly to every route
    pub latency_ms: u64,
    /// Whether to answer every request with 401
    pub fail_auth: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: 500,
            fail_auth: false,
        }
    }
}

/// In-memory record collections behind the mock routes
#[derive(Debug, Default)]
pub struct MockDataset {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub expenses: Vec<Expense>,
    pub friends: Vec<Friend>,
    pub settlements: Vec<Settlement>,
}

impl MockDataset {
    /// Empty collections
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixture dataset the app is developed against
    pub fn seeded() -> Self {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 10, 18, 30, 0).unwrap();

        let seed_user = |id: &str, name: &str, email: &str| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            avatar_url: Some(format!("https://i.pravatar.cc/150?u={}", id)),
            firebase_uid: format!("firebase-{}", id),
            is_active: true,
            preferred_currency: "INR".to_string(),
            created_at: t0,
            updated_at: t0,
        };

        let users = vec![
            seed_user("user-1", "You", "you@example.com"),
            seed_user("user-2", "Priya Sharma", "priya@example.com"),
            seed_user("user-3", "Arjun Patel", "arjun@example.com"),
            seed_user("user-4", "Meera Nair", "meera@example.com"),
        ];

        let groups = vec![
            Group {
                id: "group-1".to_string(),
                name: "Goa Trip".to_string(),
                description: Some("New year beach trip".to_string()),
                avatar_url: None,
                created_by: "user-1".to_string(),
                members: vec![
                    "user-1".to_string(),
                    "user-2".to_string(),
                    "user-3".to_string(),
                ],
                member_details: None,
                total_expenses: Decimal::new(450000, 2),
                currency: "INR".to_string(),
                is_active: true,
                created_at: t0,
                updated_at: t1,
            },
            Group {
                id: "group-2".to_string(),
                name: "Flat 4B".to_string(),
                description: Some("Monthly flat expenses".to_string()),
                avatar_url: None,
                created_by: "user-2".to_string(),
                members: vec!["user-1".to_string(), "user-2".to_string(), "user-4".to_string()],
                member_details: None,
                total_expenses: Decimal::new(1280000, 2),
                currency: "INR".to_string(),
                is_active: true,
                created_at: t0,
                updated_at: t1,
            },
        ];

        let expenses = vec![
            Expense {
                id: "expense-1".to_string(),
                group_id: "group-1".to_string(),
                group_name: "Goa Trip".to_string(),
                description: "Beach shack dinner".to_string(),
                amount: Decimal::new(240000, 2),
                currency: "INR".to_string(),
                category: "Food".to_string(),
                category_icon: "food".to_string(),
                paid_by: "user-1".to_string(),
                paid_by_name: "You".to_string(),
                paid_by_avatar: None,
                split_method: SplitMethod::Equal,
                split_among: vec![
                    "user-1".to_string(),
                    "user-2".to_string(),
                    "user-3".to_string(),
                ],
                split_details: vec![
                    SplitDetail {
                        user_id: "user-1".to_string(),
                        name: "You".to_string(),
                        amount: Decimal::new(80000, 2),
                        percentage: 33.33,
                    },
                    SplitDetail {
                        user_id: "user-2".to_string(),
                        name: "Priya Sharma".to_string(),
                        amount: Decimal::new(80000, 2),
                        percentage: 33.33,
                    },
                    SplitDetail {
                        user_id: "user-3".to_string(),
                        name: "Arjun Patel".to_string(),
                        amount: Decimal::new(80000, 2),
                        percentage: 33.33,
                    },
                ],
                expense_date: t1.date_naive(),
                notes: None,
                receipt_url: None,
                status: ExpenseStatus::Active,
                created_by: "user-1".to_string(),
                created_at: t1,
                updated_at: t1,
            },
            // Soft-deleted record; listings intentionally do not filter it out
            Expense {
                id: "expense-2".to_string(),
                group_id: "group-1".to_string(),
                group_name: "Goa Trip".to_string(),
                description: "Duplicate cab entry".to_string(),
                amount: Decimal::new(55000, 2),
                currency: "INR".to_string(),
                category: "Travel".to_string(),
                category_icon: "travel".to_string(),
                paid_by: "user-2".to_string(),
                paid_by_name: "Priya Sharma".to_string(),
                paid_by_avatar: None,
                split_method: SplitMethod::Equal,
                split_among: vec!["user-1".to_string(), "user-2".to_string()],
                split_details: vec![],
                expense_date: t1.date_naive(),
                notes: None,
                receipt_url: None,
                status: ExpenseStatus::Deleted,
                created_by: "user-2".to_string(),
                created_at: t1,
                updated_at: t1,
            },
        ];

        let friends = vec![
            Friend {
                id: "friend-1".to_string(),
                user_id: "user-1".to_string(),
                friend_id: "user-2".to_string(),
                friend_name: "Priya Sharma".to_string(),
                friend_email: "priya@example.com".to_string(),
                friend_avatar: None,
                status: FriendStatus::Accepted,
                balance: Decimal::new(35000, 2),
                balance_status: BalanceStatus::Owed,
                shared_groups: vec!["group-1".to_string(), "group-2".to_string()],
                created_at: t0,
                accepted_at: Some(t0),
                rejected_at: None,
            },
            Friend {
                id: "friend-2".to_string(),
                user_id: "user-1".to_string(),
                friend_id: "user-3".to_string(),
                friend_name: "Arjun Patel".to_string(),
                friend_email: "arjun@example.com".to_string(),
                friend_avatar: None,
                status: FriendStatus::Pending,
                balance: Decimal::ZERO,
                balance_status: BalanceStatus::Settled,
                shared_groups: vec!["group-1".to_string()],
                created_at: t1,
                accepted_at: None,
                rejected_at: None,
            },
        ];

        let settlements = vec![Settlement {
            id: "settlement-1".to_string(),
            group_id: "group-1".to_string(),
            group_name: "Goa Trip".to_string(),
            from_user_id: "user-3".to_string(),
            from_user_name: "Arjun Patel".to_string(),
            from_user_avatar: None,
            to_user_id: "user-1".to_string(),
            to_user_name: "You".to_string(),
            to_user_avatar: None,
            amount: Decimal::new(80000, 2),
            currency: "INR".to_string(),
            payment_method: PaymentMethod::Upi,
            payment_reference: Some("UPI-20250110-001".to_string()),
            notes: None,
            status: SettlementStatus::Completed,
            settled_at: Some(t1),
            created_at: t1,
        }];

        Self {
            users,
            groups,
            expenses,
            friends,
            settlements,
        }
    }
}

impl MockApiServer {
    /// Start a new mock server on a random available port with seeded data
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        Self::start_with_dataset(config, MockDataset::seeded())
    }

    /// Start with a specific dataset (random port)
    pub fn start_with_dataset(config: MockConfig, dataset: MockDataset) -> std::io::Result<Self> {
        Self::start_on_port(0, config, dataset)
    }

    /// Start on a specific port (0 for random)
    pub fn start_on_port(
        port: u16,
        config: MockConfig,
        dataset: MockDataset,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(format!("127.0.0.1:{}", port))?;
        let actual_port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let data = Arc::new(Mutex::new(dataset));
        let data_clone = data.clone();

        // Non-blocking accept so the loop can observe the shutdown flag
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let data = data_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &data);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port: actual_port,
            running,
            data,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the port the server is listening on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Shared handle to the record collections (for test assertions)
    pub fn dataset(&self) -> Arc<Mutex<MockDataset>> {
        self.data.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Connection handling
// =============================================================================

fn handle_connection(mut stream: TcpStream, config: &MockConfig, data: &Arc<Mutex<MockDataset>>) {
    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, r#"{"error": "Bad Request", "message": "Invalid request"}"#);
        return;
    };

    // Uniform artificial latency on every route
    if config.latency_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.latency_ms));
    }

    if config.fail_auth {
        send_response(
            &mut stream,
            401,
            r#"{"error": "Unauthorized", "message": "Invalid token"}"#,
        );
        return;
    }

    let (status, body) = route(&request, data);
    send_response(&mut stream, status, &body);
}

/// A parsed inbound HTTP request
struct MockRequest {
    method: String,
    path: String,
    query: Option<String>,
    bearer: Option<String>,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<MockRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    // Read until the blank line ending the headers
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subsequence(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        if buffer.len() > 64 * 1024 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    // Read the remainder of the body, if any
    while buffer.len() < header_end + content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }
    let body_end = std::cmp::min(buffer.len(), header_end + content_length);
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).to_string();

    let first_line = head.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?.to_string();
    let raw_path = parts.next()?;
    let (path, query) = match raw_path.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (raw_path.to_string(), None),
    };

    let bearer = head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("authorization") {
            value.trim().strip_prefix("Bearer ").map(str::to_string)
        } else {
            None
        }
    });

    Some(MockRequest {
        method,
        path,
        query,
        bearer,
        body,
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

// =============================================================================
// Routing
// =============================================================================

fn route(request: &MockRequest, data: &Arc<Mutex<MockDataset>>) -> (u16, String) {
    let mut db = data.lock().expect("mock dataset lock");

    let Some(rest) = request.path.strip_prefix("/api/v1") else {
        return not_found("Endpoint not found");
    };

    // Open routes
    match (request.method.as_str(), rest) {
        ("POST", "/auth/login") => return handle_login(&request.body, &db),
        ("POST", "/auth/register") => return handle_register(&request.body, &mut db),
        ("GET", "/health") => {
            return ok(json!({
                "status": "UP",
                "message": "Mock API running",
                "timestamp": Utc::now(),
            }))
        }
        _ => {}
    }

    // Everything else requires a bearer token issued by this mock
    let Some(caller) = resolve_caller(request.bearer.as_deref(), &db) else {
        return (
            401,
            json!({"error": "Unauthorized", "message": "Missing or invalid token"}).to_string(),
        );
    };

    match (request.method.as_str(), rest) {
        ("GET", "/users") => ok(json!(db.users)),
        ("GET", "/users/me") => ok(json!(caller)),
        ("GET", "/users/search") => {
            let q = query_param(request.query.as_deref(), "q")
                .unwrap_or_default()
                .to_lowercase();
            let matches: Vec<&User> = db
                .users
                .iter()
                .filter(|u| {
                    u.name.to_lowercase().contains(&q) || u.email.to_lowercase().contains(&q)
                })
                .collect();
            ok(json!(matches))
        }
        ("GET", p) if p.starts_with("/users/email/") => {
            let email = percent_decode(&p["/users/email/".len()..]);
            let search = email.trim().to_lowercase();
            match db
                .users
                .iter()
                .find(|u| u.email.trim().to_lowercase() == search)
            {
                Some(user) => ok(json!(user)),
                None => not_found(&format!("No user with email: {}", email)),
            }
        }
        ("GET", p) if p.starts_with("/users/") => {
            let id = &p["/users/".len()..];
            match db.users.iter().find(|u| u.id == id) {
                Some(user) => ok(json!(user)),
                None => not_found(&format!("No user with id: {}", id)),
            }
        }
        ("POST", "/users") => handle_create_user(&request.body, &mut db),
        ("PUT", p) if p.starts_with("/users/") => {
            let id = p["/users/".len()..].to_string();
            handle_update_user(&id, &request.body, &mut db)
        }
        ("GET", "/groups") => ok(json!(db.groups)),
        ("POST", "/groups") => handle_create_group(&request.body, &caller, &mut db),
        ("GET", "/expenses") => ok(json!(db.expenses)),
        ("POST", "/expenses") => handle_create_expense(&request.body, &caller, &mut db),
        ("GET", "/friends") => ok(json!(db.friends)),
        ("GET", "/settlements") => ok(json!(db.settlements)),
        ("POST", "/settlements") => handle_record_settlement(&request.body, &mut db),
        ("GET" | "POST" | "PUT", _) => not_found("Endpoint not found"),
        _ => (
            405,
            json!({"error": "Method Not Allowed", "message": "Method not allowed"}).to_string(),
        ),
    }
}

fn resolve_caller(bearer: Option<&str>, db: &MockDataset) -> Option<User> {
    let user_id = bearer?.strip_prefix("mock-token-")?;
    db.users.iter().find(|u| u.id == user_id).cloned()
}

fn ok(body: JsonValue) -> (u16, String) {
    (200, body.to_string())
}

fn not_found(message: &str) -> (u16, String) {
    (
        404,
        json!({"error": "Not found", "message": message}).to_string(),
    )
}

fn bad_request() -> (u16, String) {
    (
        400,
        json!({"error": "Bad Request", "message": "Invalid request body"}).to_string(),
    )
}

fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| percent_decode(v))
    })
}

/// Minimal percent-decoding for path segments and query values
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() && s.is_char_boundary(i + 3) => {
                match u8::from_str_radix(&s[i + 1..i + 3], 16) {
                    Ok(b) => {
                        out.push(b);
                        i += 3;
                    }
                    Err(_) => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// =============================================================================
// Route handlers
// =============================================================================

fn handle_login(body: &str, db: &MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<LoginRequest>(body) else {
        return bad_request();
    };

    // Linear scan with normalized email comparison
    let search = request.email.trim().to_lowercase();
    let found = db
        .users
        .iter()
        .find(|u| u.email.trim().to_lowercase() == search);

    match found {
        Some(user) => ok(json!({
            "user": user,
            "token": format!("mock-token-{}", user.id),
            "message": "Login successful",
        })),
        None => (
            404,
            json!({
                "error": "User not found",
                "message": format!("No user with email: {}", request.email),
            })
            .to_string(),
        ),
    }
}

fn handle_register(body: &str, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<RegisterRequest>(body) else {
        return bad_request();
    };

    let search = request.email.trim().to_lowercase();
    if db
        .users
        .iter()
        .any(|u| u.email.trim().to_lowercase() == search)
    {
        return (
            409,
            json!({"error": "Conflict", "message": "User already exists"}).to_string(),
        );
    }

    let now = Utc::now();
    let user = User {
        id: prefixed_id("user"),
        name: request.name,
        email: request.email,
        phone: request.phone,
        avatar_url: Some("https://i.pravatar.cc/150".to_string()),
        firebase_uid: prefixed_id("firebase"),
        is_active: true,
        preferred_currency: "INR".to_string(),
        created_at: now,
        updated_at: now,
    };
    db.users.push(user.clone());

    let token = format!("mock-token-{}", user.id);
    ok(json!({
        "user": user,
        "token": token,
        "message": "Registration successful",
    }))
}

fn handle_create_user(body: &str, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<CreateUserRequest>(body) else {
        return bad_request();
    };

    let now = Utc::now();
    let user = User {
        id: prefixed_id("user"),
        name: request.name,
        email: request.email,
        phone: request.phone,
        avatar_url: request
            .avatar_url
            .or_else(|| Some("https://i.pravatar.cc/150".to_string())),
        firebase_uid: request.firebase_uid,
        is_active: true,
        preferred_currency: request.preferred_currency.unwrap_or_else(|| "INR".to_string()),
        created_at: now,
        updated_at: now,
    };
    db.users.push(user.clone());
    ok(json!(user))
}

fn handle_update_user(id: &str, body: &str, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<UpdateUserRequest>(body) else {
        return bad_request();
    };

    let Some(user) = db.users.iter_mut().find(|u| u.id == id) else {
        return not_found(&format!("No user with id: {}", id));
    };

    if let Some(name) = request.name {
        user.name = name;
    }
    if let Some(phone) = request.phone {
        user.phone = Some(phone);
    }
    if let Some(avatar_url) = request.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    if let Some(currency) = request.preferred_currency {
        user.preferred_currency = currency;
    }
    user.updated_at = Utc::now();

    let updated = user.clone();
    ok(json!(updated))
}

fn handle_create_group(body: &str, caller: &User, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<CreateGroupRequest>(body) else {
        return bad_request();
    };

    let now = Utc::now();
    let group = Group {
        id: prefixed_id("group"),
        name: request.name,
        description: request.description,
        avatar_url: request.avatar_url,
        created_by: caller.id.clone(),
        members: request.members,
        member_details: None,
        total_expenses: Decimal::ZERO,
        currency: caller.preferred_currency.clone(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.groups.push(group.clone());
    ok(json!(group))
}

fn handle_create_expense(body: &str, caller: &User, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<CreateExpenseRequest>(body) else {
        return bad_request();
    };

    let group_name = db
        .groups
        .iter()
        .find(|g| g.id == request.group_id)
        .map(|g| g.name.clone())
        .unwrap_or_default();
    let payer = db.users.iter().find(|u| u.id == request.paid_by);

    let now = Utc::now();
    let expense = Expense {
        id: prefixed_id("expense"),
        group_id: request.group_id,
        group_name,
        description: request.description,
        amount: request.amount,
        currency: request.currency,
        category_icon: category_icon(&request.category),
        category: request.category,
        paid_by: request.paid_by.clone(),
        paid_by_name: payer.map(|u| u.name.clone()).unwrap_or_default(),
        paid_by_avatar: payer.and_then(|u| u.avatar_url.clone()),
        split_method: request.split_method,
        split_among: request.split_among,
        split_details: request.split_details.unwrap_or_default(),
        expense_date: request.expense_date,
        notes: request.notes,
        receipt_url: None,
        status: ExpenseStatus::Active,
        created_by: caller.id.clone(),
        created_at: now,
        updated_at: now,
    };
    db.expenses.push(expense.clone());
    ok(json!(expense))
}

fn handle_record_settlement(body: &str, db: &mut MockDataset) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<RecordSettlementRequest>(body) else {
        return bad_request();
    };

    let group_name = db
        .groups
        .iter()
        .find(|g| g.id == request.group_id)
        .map(|g| g.name.clone())
        .unwrap_or_default();
    let name_of = |id: &str, db: &MockDataset| {
        db.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    };

    let now = Utc::now();
    let settlement = Settlement {
        id: prefixed_id("settlement"),
        group_id: request.group_id,
        group_name,
        from_user_name: name_of(&request.from_user_id, db),
        from_user_id: request.from_user_id,
        from_user_avatar: None,
        to_user_name: name_of(&request.to_user_id, db),
        to_user_id: request.to_user_id,
        to_user_avatar: None,
        amount: request.amount,
        currency: request.currency,
        payment_method: request.payment_method,
        payment_reference: request.payment_reference,
        notes: request.notes,
        status: SettlementStatus::Completed,
        settled_at: Some(now),
        created_at: now,
    };
    db.settlements.push(settlement.clone());
    ok(json!(settlement))
}

fn category_icon(category: &str) -> String {
    match category.to_lowercase().as_str() {
        "food" => "food",
        "travel" => "travel",
        "stay" | "accommodation" => "hotel",
        "shopping" => "shopping",
        "entertainment" => "movie",
        _ => "receipt",
    }
    .to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> MockConfig {
        MockConfig {
            latency_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_mock_server_starts_on_random_port() {
        let server = MockApiServer::start(quick_config()).unwrap();
        assert!(server.port() > 0);
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = MockApiServer::start(quick_config()).unwrap();

        let response = reqwest::get(format!("{}/api/v1/health", server.base_url()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let body: JsonValue = response.json().await.unwrap();
        assert_eq!(body["status"], "UP");
        assert_eq!(body["message"], "Mock API running");
    }

    #[tokio::test]
    async fn test_login_matches_email_case_insensitively() {
        let server = MockApiServer::start(quick_config()).unwrap();
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/v1/auth/login", server.base_url()))
            .json(&json!({"email": "  YOU@Example.COM ", "password": "whatever"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let body: JsonValue = response.json().await.unwrap();
        assert_eq!(body["user"]["email"], "you@example.com");
        assert_eq!(body["token"], "mock-token-user-1");
    }

    #[tokio::test]
    async fn test_login_unknown_email_names_the_address() {
        let server = MockApiServer::start(quick_config()).unwrap();
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/v1/auth/login", server.base_url()))
            .json(&json!({"email": "missing@nowhere.com", "password": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let body: JsonValue = response.json().await.unwrap();
        assert_eq!(body["message"], "No user with email: missing@nowhere.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let server = MockApiServer::start(quick_config()).unwrap();
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/v1/auth/register", server.base_url()))
            .json(&json!({"name": "Imposter", "email": "PRIYA@example.com", "password": "secret1"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 409);

        let users = server.dataset();
        let count = users.lock().unwrap().users.len();
        assert_eq!(count, 4, "no duplicate record should be created");
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer_token() {
        let server = MockApiServer::start(quick_config()).unwrap();

        let response = reqwest::get(format!("{}/api/v1/users", server.base_url()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_fail_auth_forces_401_everywhere() {
        let server = MockApiServer::start(MockConfig {
            latency_ms: 0,
            fail_auth: true,
        })
        .unwrap();

        let response = reqwest::get(format!("{}/api/v1/health", server.base_url()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_unknown_route_is_a_structured_404() {
        let server = MockApiServer::start(quick_config()).unwrap();
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{}/api/v1/nope", server.base_url()))
            .bearer_auth("mock-token-user-1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let body: JsonValue = response.json().await.unwrap();
        assert_eq!(body["message"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_expense_listing_does_not_filter_soft_deleted() {
        let server = MockApiServer::start(quick_config()).unwrap();
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{}/api/v1/expenses", server.base_url()))
            .bearer_auth("mock-token-user-1")
            .send()
            .await
            .unwrap();
        let body: JsonValue = response.json().await.unwrap();
        let statuses: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["status"].as_str().unwrap())
            .collect();
        assert!(statuses.contains(&"DELETED"));
    }
}
