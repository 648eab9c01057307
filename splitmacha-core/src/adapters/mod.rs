//! Adapter implementations
//!
//! Adapters implement the port traits and transport concerns with concrete
//! technologies:
//! - reqwest HTTP client for the SplitMacha API
//! - JSON document session store (plus an in-memory store for tests)
//! - Mock API server standing in for the backend during development

pub mod api;
pub mod id;
pub mod mock_server;
pub mod storage;
