//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! matching the backend wire contract - no I/O or external dependencies.

mod expense;
mod friend;
mod group;
pub mod result;
mod session;
mod settlement;
mod user;

pub use expense::{CreateExpenseRequest, Expense, ExpenseStatus, SplitDetail, SplitMethod};
pub use friend::{BalanceStatus, Friend, FriendStatus};
pub use group::{CreateGroupRequest, Group, GroupMember};
pub use session::Session;
pub use settlement::{PaymentMethod, RecordSettlementRequest, Settlement, SettlementStatus};
pub use user::{CreateUserRequest, UpdateUserRequest, User};
