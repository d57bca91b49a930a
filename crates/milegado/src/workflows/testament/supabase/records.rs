use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde::Serialize;

use super::{failure, SupabaseClient};
use crate::workflows::testament::auth::AuthSession;
use crate::workflows::testament::domain::{NewWillRecord, RecordId, WillRecord, WillRecordChanges};
use crate::workflows::testament::repository::{RepositoryError, WillRepository};

const TABLE_PATH: &str = "/rest/v1/testamentos";

/// `testamentos` rows through PostgREST. Every query also filters on
/// `user_id` explicitly, on top of the server's row-level security.
#[derive(Debug, Clone)]
pub struct SupabaseWillRepository {
    client: SupabaseClient,
}

#[derive(Serialize)]
struct StampedChanges<'a> {
    #[serde(flatten)]
    changes: &'a WillRecordChanges,
    updated_at: chrono::DateTime<Utc>,
}

impl SupabaseWillRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn rows_query(session: &AuthSession, id: Option<RecordId>) -> String {
        let mut query = format!("{TABLE_PATH}?user_id=eq.{}", session.owner_id());
        if let Some(id) = id {
            query.push_str(&format!("&id=eq.{id}"));
        }
        query
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<WillRecord>, RepositoryError> {
        let response = request
            .send()
            .await
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            let failure = failure(response).await;
            return Err(match failure.status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepositoryError::Unauthorized,
                status => RepositoryError::Rejected {
                    status: status.as_u16(),
                    message: failure.message,
                },
            });
        }

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        response
            .json::<Vec<WillRecord>>()
            .await
            .map_err(|err| RepositoryError::Unavailable(format!("unexpected row shape: {err}")))
    }

    fn single(rows: Vec<WillRecord>) -> Result<WillRecord, RepositoryError> {
        rows.into_iter().next().ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl WillRepository for SupabaseWillRepository {
    async fn insert(
        &self,
        session: &AuthSession,
        record: NewWillRecord,
    ) -> Result<WillRecord, RepositoryError> {
        if record.owner_id != session.owner_id() {
            return Err(RepositoryError::Unauthorized);
        }
        let request = self
            .client
            .request(Method::POST, TABLE_PATH, Some(session.access_token.as_str()))
            .header("Prefer", "return=representation")
            .json(&record);
        Self::single(self.send(request).await?)
    }

    async fn update(
        &self,
        session: &AuthSession,
        id: RecordId,
        changes: WillRecordChanges,
    ) -> Result<WillRecord, RepositoryError> {
        let body = StampedChanges {
            changes: &changes,
            updated_at: Utc::now(),
        };
        let request = self
            .client
            .request(
                Method::PATCH,
                &Self::rows_query(session, Some(id)),
                Some(session.access_token.as_str()),
            )
            .header("Prefer", "return=representation")
            .json(&body);
        Self::single(self.send(request).await?)
    }

    async fn delete(&self, session: &AuthSession, id: RecordId) -> Result<(), RepositoryError> {
        let request = self
            .client
            .request(
                Method::DELETE,
                &Self::rows_query(session, Some(id)),
                Some(session.access_token.as_str()),
            )
            .header("Prefer", "return=representation");
        Self::single(self.send(request).await?).map(|_| ())
    }

    async fn list_by_owner(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<WillRecord>, RepositoryError> {
        let path = format!(
            "{}&select=*&order=created_at.desc",
            Self::rows_query(session, None)
        );
        let request = self
            .client
            .request(Method::GET, &path, Some(session.access_token.as_str()));
        self.send(request).await
    }

    async fn get_by_id(
        &self,
        session: &AuthSession,
        id: RecordId,
    ) -> Result<WillRecord, RepositoryError> {
        let path = format!("{}&select=*", Self::rows_query(session, Some(id)));
        let request = self
            .client
            .request(Method::GET, &path, Some(session.access_token.as_str()));
        Self::single(self.send(request).await?)
    }
}
