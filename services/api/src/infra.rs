use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use milegado::workflows::testament::auth::{
    AuthError, AuthGateway, AuthSession, AuthUser, Credentials, SignUpOutcome,
};
use milegado::workflows::testament::domain::{
    NewWillRecord, OwnerId, RecordId, WillRecord, WillRecordChanges,
};
use milegado::workflows::testament::repository::{RepositoryError, WillRepository};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex.lock().map_err(|_| format!("{what} mutex poisoned"))
}

/// Process-local `testamentos` table used when no hosted database is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryWillRepository {
    records: Arc<Mutex<HashMap<RecordId, WillRecord>>>,
}

impl InMemoryWillRepository {
    fn records(&self) -> Result<MutexGuard<'_, HashMap<RecordId, WillRecord>>, RepositoryError> {
        lock(&self.records, "repository").map_err(RepositoryError::Unavailable)
    }
}

#[async_trait]
impl WillRepository for InMemoryWillRepository {
    async fn insert(
        &self,
        session: &AuthSession,
        record: NewWillRecord,
    ) -> Result<WillRecord, RepositoryError> {
        if record.owner_id != session.owner_id() {
            return Err(RepositoryError::Unauthorized);
        }
        let now = Utc::now();
        let stored = WillRecord {
            id: RecordId::generate(),
            owner_id: record.owner_id,
            testator: record.testator,
            assets: record.assets,
            beneficiaries: record.beneficiaries,
            special_instructions: record.special_instructions,
            created_at: now,
            updated_at: now,
        };
        self.records()?.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        session: &AuthSession,
        id: RecordId,
        changes: WillRecordChanges,
    ) -> Result<WillRecord, RepositoryError> {
        let mut records = self.records()?;
        let record = records
            .get_mut(&id)
            .filter(|record| record.owner_id == session.owner_id())
            .ok_or(RepositoryError::NotFound)?;
        changes.apply_to(record, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, session: &AuthSession, id: RecordId) -> Result<(), RepositoryError> {
        let mut records = self.records()?;
        let owned = records
            .get(&id)
            .is_some_and(|record| record.owner_id == session.owner_id());
        if !owned {
            return Err(RepositoryError::NotFound);
        }
        records.remove(&id);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<WillRecord>, RepositoryError> {
        let mut owned: Vec<WillRecord> = self
            .records()?
            .values()
            .filter(|record| record.owner_id == session.owner_id())
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get_by_id(
        &self,
        session: &AuthSession,
        id: RecordId,
    ) -> Result<WillRecord, RepositoryError> {
        self.records()?
            .get(&id)
            .filter(|record| record.owner_id == session.owner_id())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

/// Development identity store: accounts and opaque tokens live in memory.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuthGateway {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    tokens: Arc<Mutex<HashMap<String, AuthUser>>>,
}

impl InMemoryAuthGateway {
    fn issue(&self, user: AuthUser) -> Result<AuthSession, AuthError> {
        let access_token = Uuid::new_v4().simple().to_string();
        lock(&self.tokens, "token")
            .map_err(AuthError::Unavailable)?
            .insert(access_token.clone(), user.clone());
        Ok(AuthSession { user, access_token })
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(lock(&self.tokens, "token")
            .map_err(AuthError::Unavailable)?
            .get(access_token)
            .cloned())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let user = lock(&self.accounts, "account")
            .map_err(AuthError::Unavailable)?
            .get(&credentials.email.trim().to_lowercase())
            .filter(|account| account.password == credentials.password)
            .map(|account| account.user.clone())
            .ok_or(AuthError::InvalidCredentials)?;
        self.issue(user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        let email = credentials.email.trim().to_lowercase();
        let user = {
            let mut accounts = lock(&self.accounts, "account").map_err(AuthError::Unavailable)?;
            if accounts.contains_key(&email) {
                return Err(AuthError::Rejected {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
            let user = AuthUser {
                id: OwnerId(Uuid::new_v4()),
                email: email.clone(),
            };
            accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    password: credentials.password.clone(),
                },
            );
            user
        };
        self.issue(user).map(SignUpOutcome::SignedIn)
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        lock(&self.tokens, "token")
            .map_err(AuthError::Unavailable)?
            .remove(&session.access_token);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
