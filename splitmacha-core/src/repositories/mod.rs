//! Repositories - typed façades over the HTTP client
//!
//! One function per backend operation, no branching logic, no retries.
//! Input and output shapes match the wire contract exactly; nothing is
//! transformed or defaulted on the way through.

pub mod auth;
mod expense;
mod friend;
mod group;
mod settlement;
mod system;
mod user;

pub use auth::{AuthRepository, AuthResponse, LoginRequest, RegisterRequest};
pub use expense::ExpenseRepository;
pub use friend::FriendRepository;
pub use group::GroupRepository;
pub use settlement::SettlementRepository;
pub use system::{HealthStatus, SystemRepository};
pub use user::UserRepository;
