use async_trait::async_trait;

use super::auth::AuthSession;
use super::domain::{NewWillRecord, RecordId, WillRecord, WillRecordChanges};

/// Storage abstraction over the hosted `testamentos` table.
///
/// Every call carries the caller's session; rows owned by someone else behave
/// exactly like missing rows.
#[async_trait]
pub trait WillRepository: Send + Sync {
    async fn insert(
        &self,
        session: &AuthSession,
        record: NewWillRecord,
    ) -> Result<WillRecord, RepositoryError>;

    /// Last write wins; `updated_at` is bumped by the store.
    async fn update(
        &self,
        session: &AuthSession,
        id: RecordId,
        changes: WillRecordChanges,
    ) -> Result<WillRecord, RepositoryError>;

    async fn delete(&self, session: &AuthSession, id: RecordId) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn list_by_owner(&self, session: &AuthSession)
        -> Result<Vec<WillRecord>, RepositoryError>;

    async fn get_by_id(
        &self,
        session: &AuthSession,
        id: RecordId,
    ) -> Result<WillRecord, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("session is not allowed to access this record")]
    Unauthorized,
    #[error("repository rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
