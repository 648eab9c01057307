//! SplitMacha Core - client logic for the SplitMacha expense-splitting app
//!
//! This crate implements the client core following hexagonal architecture:
//!
//! - **domain**: Wire entities (User, Group, Expense, etc.) and the error taxonomy
//! - **ports**: Trait definitions for external dependencies (SessionStore)
//! - **repositories**: Typed façades, one function per backend operation
//! - **services**: Session lifecycle orchestration and event logging
//! - **adapters**: Concrete implementations (HTTP client, file store, mock backend)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod repositories;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::api::ApiClient;
use adapters::mock_server::{MockApiServer, MockConfig};
use adapters::storage::FileSessionStore;
use config::Config;
use ports::SessionStore;
use repositories::{
    AuthRepository, ExpenseRepository, FriendRepository, GroupRepository, SettlementRepository,
    SystemRepository, UserRepository,
};
use services::{LoggingService, SessionService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{Expense, Friend, Group, Session, Settlement, User};
pub use services::{AuthSnapshot, EntryPoint, LogEvent};

/// Main context for SplitMacha operations
///
/// This is the primary entry point for the client core. It holds the
/// configuration, session store, API client and all repositories. In mock
/// mode a local seeded backend is started and every call is routed to it.
pub struct SplitmachaContext {
    pub config: Config,
    pub session_store: Arc<dyn SessionStore>,
    pub api: Arc<ApiClient>,
    pub logger: Arc<LoggingService>,
    pub session_service: SessionService,
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub expenses: ExpenseRepository,
    pub friends: FriendRepository,
    pub settlements: SettlementRepository,
    pub system: SystemRepository,
    // Keeps the dev backend alive for the lifetime of the context
    mock_server: Option<MockApiServer>,
}

impl SplitmachaContext {
    /// Create a new SplitMacha context
    pub fn new(app_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let logger = Arc::new(LoggingService::new(
            app_dir,
            entry_point,
            env!("CARGO_PKG_VERSION"),
        )?);
        let session_store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(app_dir));

        // In mock mode the whole API surface is answered locally; the client
        // code path is identical either way.
        let (base_url, mock_server) = if config.mock_mode {
            let server = MockApiServer::start(MockConfig {
                latency_ms: config.mock_latency_ms,
                fail_auth: false,
            })?;
            (server.base_url(), Some(server))
        } else {
            let base = config
                .api_base_url
                .clone()
                .unwrap_or_else(adapters::api::get_base_url);
            (base, None)
        };

        let api = Arc::new(ApiClient::new(
            &base_url,
            session_store.clone(),
            Some(logger.clone()),
        )?);

        let session_service = SessionService::new(
            session_store.clone(),
            AuthRepository::new(api.clone()),
            UserRepository::new(api.clone()),
            Some(logger.clone()),
        );

        Ok(Self {
            config,
            session_store,
            logger,
            session_service,
            users: UserRepository::new(api.clone()),
            groups: GroupRepository::new(api.clone()),
            expenses: ExpenseRepository::new(api.clone()),
            friends: FriendRepository::new(api.clone()),
            settlements: SettlementRepository::new(api.clone()),
            system: SystemRepository::new(api.clone()),
            api,
            mock_server,
        })
    }

    /// True when calls are served by the local mock backend
    pub fn is_mock(&self) -> bool {
        self.mock_server.is_some()
    }
}
