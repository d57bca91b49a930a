use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::workflows::testament::auth::{
    AuthError, AuthGateway, AuthSession, AuthUser, Credentials, SessionContext, SignUpOutcome,
};
use crate::workflows::testament::domain::{
    AssetCategory, AssetItem, Beneficiary, NewWillRecord, OwnerId, RecordId, Relationship,
    WillRecord, WillRecordChanges,
};
use crate::workflows::testament::repository::{RepositoryError, WillRepository};
use crate::workflows::testament::router::WillRouterState;
use crate::workflows::testament::service::WillService;
use crate::workflows::testament::validation::WillSubmission;

pub(super) const JUAN_TOKEN: &str = "token-juan";
pub(super) const ANA_TOKEN: &str = "token-ana";
pub(super) const PASSWORD: &str = "secreto123";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub(super) fn submission() -> WillSubmission {
    WillSubmission {
        given_names: "Juan".to_string(),
        surnames: "Pérez González".to_string(),
        national_id: "12.345.678-5".to_string(),
        birth_date: "1970-05-03".to_string(),
        marital_status: "casado".to_string(),
        address: "Av. Providencia 1234".to_string(),
        city: "Santiago".to_string(),
        assets: "Casa en Ñuñoa, Av. Irarrázaval 3300\n\nAutomóvil Toyota Corolla 2019\nCuenta corriente Banco de Chile".to_string(),
        beneficiaries: "Ana Pérez, hija, 50%\nLuis Pérez, hijo, 50%".to_string(),
        ..WillSubmission::default()
    }
}

pub(super) fn with_instructions(text: &str) -> WillSubmission {
    WillSubmission {
        special_instructions: Some(text.to_string()),
        ..submission()
    }
}

pub(super) fn asset_items() -> Vec<AssetItem> {
    vec![
        AssetItem {
            category: AssetCategory::RealEstate,
            description: "Casa en Ñuñoa".to_string(),
            estimated_value: Some(85_000_000.0),
        },
        AssetItem {
            category: AssetCategory::Vehicle,
            description: "Toyota Corolla 2019".to_string(),
            estimated_value: None,
        },
    ]
}

pub(super) fn child(name: &str, percentage: f64) -> Beneficiary {
    Beneficiary::new(name, "11.111.111-1", Relationship::Child, percentage)
}

pub(super) fn sibling(name: &str, percentage: f64) -> Beneficiary {
    Beneficiary::new(name, "22.222.222-2", Relationship::Sibling, percentage)
}

pub(super) fn user(email: &str, seed: u128) -> AuthUser {
    AuthUser {
        id: OwnerId(Uuid::from_u128(seed)),
        email: email.to_string(),
    }
}

pub(super) fn juan() -> AuthSession {
    AuthSession {
        user: user("juan@example.cl", 1),
        access_token: JUAN_TOKEN.to_string(),
    }
}

pub(super) fn ana() -> AuthSession {
    AuthSession {
        user: user("ana@example.cl", 2),
        access_token: ANA_TOKEN.to_string(),
    }
}

pub(super) fn signed_in(session: AuthSession) -> SessionContext {
    SessionContext::Authenticated(session)
}

/// Rows kept in memory, scoped by owner the way row-level security scopes them.
#[derive(Default)]
pub(super) struct MemoryRepository {
    rows: Mutex<Vec<WillRecord>>,
}

impl MemoryRepository {
    pub(super) fn rows(&self) -> Vec<WillRecord> {
        self.rows.lock().expect("rows lock").clone()
    }
}

#[async_trait]
impl WillRepository for MemoryRepository {
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
        self.rows.lock().expect("rows lock").push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        session: &AuthSession,
        id: RecordId,
        changes: WillRecordChanges,
    ) -> Result<WillRecord, RepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let row = rows
            .iter_mut()
            .find(|row| row.id == id && row.owner_id == session.owner_id())
            .ok_or(RepositoryError::NotFound)?;
        changes.apply_to(row, Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, session: &AuthSession, id: RecordId) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| !(row.id == id && row.owner_id == session.owner_id()));
        if rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_by_owner(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<WillRecord>, RepositoryError> {
        let mut owned: Vec<WillRecord> = self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|row| row.owner_id == session.owner_id())
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
        self.rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id == id && row.owner_id == session.owner_id())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl WillRepository for UnavailableRepository {
    async fn insert(
        &self,
        _session: &AuthSession,
        _record: NewWillRecord,
    ) -> Result<WillRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn update(
        &self,
        _session: &AuthSession,
        _id: RecordId,
        _changes: WillRecordChanges,
    ) -> Result<WillRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _session: &AuthSession, _id: RecordId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn list_by_owner(
        &self,
        _session: &AuthSession,
    ) -> Result<Vec<WillRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn get_by_id(
        &self,
        _session: &AuthSession,
        _id: RecordId,
    ) -> Result<WillRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }
}

/// Identity service double that knows Juan and Ana by token.
pub(super) struct FakeAuth {
    sessions: HashMap<String, AuthSession>,
    confirm_sign_ups: bool,
    signed_out: Mutex<Vec<String>>,
}

impl Default for FakeAuth {
    fn default() -> Self {
        let sessions = [juan(), ana()]
            .into_iter()
            .map(|session| (session.access_token.clone(), session))
            .collect();
        Self {
            sessions,
            confirm_sign_ups: false,
            signed_out: Mutex::new(Vec::new()),
        }
    }
}

impl FakeAuth {
    pub(super) fn requiring_confirmation() -> Self {
        Self {
            confirm_sign_ups: true,
            ..Self::default()
        }
    }

    pub(super) fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().expect("sign-out lock").clone()
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self
            .sessions
            .get(access_token)
            .map(|session| session.user.clone()))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        self.sessions
            .values()
            .find(|session| session.user.email == credentials.email)
            .filter(|_| credentials.password == PASSWORD)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        if self.confirm_sign_ups {
            return Ok(SignUpOutcome::ConfirmationPending {
                email: credentials.email.clone(),
            });
        }
        Ok(SignUpOutcome::SignedIn(AuthSession {
            user: user(&credentials.email, 99),
            access_token: "token-new".to_string(),
        }))
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.signed_out
            .lock()
            .expect("sign-out lock")
            .push(session.access_token.clone());
        Ok(())
    }
}

/// Identity service that cannot be reached.
pub(super) struct DownAuth;

#[async_trait]
impl AuthGateway for DownAuth {
    async fn current_user(&self, _access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Err(AuthError::Unavailable("timeout".to_string()))
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<AuthSession, AuthError> {
        Err(AuthError::Unavailable("timeout".to_string()))
    }

    async fn sign_up(&self, _credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        Err(AuthError::Unavailable("timeout".to_string()))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Err(AuthError::Unavailable("timeout".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<WillService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(WillService::new(Arc::clone(&repository)));
    (service, repository)
}

pub(super) fn router_state<R, G>(
    service: Arc<WillService<R>>,
    auth: Arc<G>,
) -> WillRouterState<R, G> {
    WillRouterState::new(service, auth).with_clock(today)
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json body")
}
