//! Identity collaborator and the explicit session context handed to handlers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::domain::OwnerId;

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: OwnerId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
}

impl AuthSession {
    pub fn owner_id(&self) -> OwnerId {
        self.user.id
    }
}

/// Who is calling. Passed explicitly into every service operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Authenticated(AuthSession),
}

impl SessionContext {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(session) => Some(session),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.session().map(|session| &session.user)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub password_confirmation: String,
}

impl SignUpRequest {
    /// Local checks that run before the identity service is contacted.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }
        if self.password != self.password_confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// The identity service sent a confirmation e-mail; no session yet.
    ConfirmationPending { email: String },
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError>;
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error("La contraseña debe tener al menos 6 caracteres")]
    WeakPassword,
    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,
    #[error("Correo electrónico inválido")]
    InvalidEmail,
    #[error("identity service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a bearer token into a [`SessionContext`]. Unknown tokens are anonymous.
pub async fn session_from_token<G>(
    gateway: &G,
    access_token: Option<&str>,
) -> Result<SessionContext, AuthError>
where
    G: AuthGateway + ?Sized,
{
    let Some(token) = access_token.map(str::trim).filter(|token| !token.is_empty()) else {
        return Ok(SessionContext::Anonymous);
    };

    Ok(match gateway.current_user(token).await? {
        Some(user) => SessionContext::Authenticated(AuthSession {
            user,
            access_token: token.to_string(),
        }),
        None => SessionContext::Anonymous,
    })
}

/// Owns the current [`SessionContext`] and broadcasts every change.
pub struct SessionManager<G> {
    gateway: Arc<G>,
    state: watch::Sender<SessionContext>,
}

impl<G> SessionManager<G>
where
    G: AuthGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(SessionContext::Anonymous);
        Self { gateway, state }
    }

    pub fn current(&self) -> SessionContext {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: Some(self.state.subscribe()),
        }
    }

    /// Re-establishes a session from a stored token.
    pub async fn restore(&self, access_token: &str) -> Result<SessionContext, AuthError> {
        let context = session_from_token(self.gateway.as_ref(), Some(access_token)).await?;
        self.state.send_replace(context.clone());
        Ok(context)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        match self.gateway.sign_in(credentials).await {
            Ok(session) => {
                info!(user = %session.user.id, "session started");
                self.state
                    .send_replace(SessionContext::Authenticated(session.clone()));
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "sign-in rejected");
                Err(err)
            }
        }
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        let credentials = request.credentials()?;
        let outcome = self.gateway.sign_up(&credentials).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.state
                .send_replace(SessionContext::Authenticated(session.clone()));
        }
        Ok(outcome)
    }

    /// Clears local state even when the remote call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.state.send_replace(SessionContext::Anonymous);
        match previous {
            SessionContext::Authenticated(session) => self.gateway.sign_out(&session).await,
            SessionContext::Anonymous => Ok(()),
        }
    }
}

/// Handle on session changes. Dropping it, or calling [`unsubscribe`](Self::unsubscribe),
/// tears the subscription down.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: Option<watch::Receiver<SessionContext>>,
}

impl SessionSubscription {
    pub fn current(&self) -> SessionContext {
        self.receiver
            .as_ref()
            .map(|receiver| receiver.borrow().clone())
            .unwrap_or_default()
    }

    /// Waits for the next change. `None` once unsubscribed or when the manager is gone.
    pub async fn changed(&mut self) -> Option<SessionContext> {
        let receiver = self.receiver.as_mut()?;
        match receiver.changed().await {
            Ok(()) => Some(receiver.borrow_and_update().clone()),
            Err(_) => {
                self.receiver = None;
                None
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}
