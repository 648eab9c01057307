//! Session store port - persisted auth state abstraction

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::Session;

/// Key-value persistence for the device session
///
/// This trait defines the persisted auth state operations. Implementations
/// (adapters) provide the actual storage access. The token and user id are
/// always stored together: a save writes both or fails, and a load only
/// reports a session when both are present.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> Result<Option<Session>>;

    /// Persist a session, replacing any previous one
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove any stored session; succeeds when none was stored
    async fn clear(&self) -> Result<()>;
}
