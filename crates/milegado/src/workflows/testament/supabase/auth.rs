use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::{failure, SupabaseClient};
use crate::workflows::testament::auth::{
    AuthError, AuthGateway, AuthSession, AuthUser, Credentials, SignUpOutcome,
};

/// GoTrue password-grant identity endpoints.
#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
    client: SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// Sign-up answers with a session when e-mail confirmation is disabled and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

impl SupabaseAuthClient {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AuthError> {
        request
            .send()
            .await
            .map_err(|err| AuthError::Unavailable(err.to_string()))
    }
}

fn rejected(status: StatusCode, message: String) -> AuthError {
    AuthError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn malformed(err: reqwest::Error) -> AuthError {
    AuthError::Unavailable(format!("unexpected identity response: {err}"))
}

#[async_trait]
impl AuthGateway for SupabaseAuthClient {
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .send(
                self.client
                    .request(Method::GET, "/auth/v1/user", Some(access_token)),
            )
            .await?;

        match response.status() {
            status if status.is_success() => response.json().await.map(Some).map_err(malformed),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => {
                let failure = failure(response).await;
                Err(rejected(failure.status, failure.message))
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let response = self
            .send(
                self.client
                    .request(Method::POST, "/auth/v1/token?grant_type=password", None)
                    .json(&serde_json::json!({
                        "email": credentials.email,
                        "password": credentials.password,
                    })),
            )
            .await?;

        if !response.status().is_success() {
            let failure = failure(response).await;
            return Err(match failure.status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials,
                status => rejected(status, failure.message),
            });
        }

        let token: TokenResponse = response.json().await.map_err(malformed)?;
        Ok(AuthSession {
            user: token.user,
            access_token: token.access_token,
        })
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .send(
                self.client
                    .request(Method::POST, "/auth/v1/signup", None)
                    .json(&serde_json::json!({
                        "email": credentials.email,
                        "password": credentials.password,
                    })),
            )
            .await?;

        if !response.status().is_success() {
            let failure = failure(response).await;
            return Err(rejected(failure.status, failure.message));
        }

        Ok(match response.json::<SignUpResponse>().await.map_err(malformed)? {
            SignUpResponse::Session(token) => SignUpOutcome::SignedIn(AuthSession {
                user: token.user,
                access_token: token.access_token,
            }),
            SignUpResponse::User(user) => SignUpOutcome::ConfirmationPending { email: user.email },
        })
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        let response = self
            .send(
                self.client
                    .request(Method::POST, "/auth/v1/logout", Some(session.access_token.as_str())),
            )
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Expired tokens are already signed out.
            StatusCode::UNAUTHORIZED => Ok(()),
            _ => {
                let failure = failure(response).await;
                Err(rejected(failure.status, failure.message))
            }
        }
    }
}
