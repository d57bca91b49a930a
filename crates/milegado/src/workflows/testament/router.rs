use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use super::auth::{
    session_from_token, AuthError, AuthGateway, AuthSession, Credentials, SessionContext,
    SignUpOutcome, SignUpRequest,
};
use super::composer::{OutputMode, RenderedWill};
use super::domain::{Beneficiary, RecordId};
use super::repository::{RepositoryError, WillRepository};
use super::service::{WillService, WillServiceError};
use super::validation::WillSubmission;

pub const RECORD_ID_HEADER: &str = "x-will-record-id";
pub const GENERIC_FAILURE: &str = "No se pudo completar la operación. Intenta nuevamente.";

pub type Clock = fn() -> NaiveDate;

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Shared handler state. `clock` supplies the document date.
pub struct WillRouterState<R, G> {
    pub service: Arc<WillService<R>>,
    pub auth: Arc<G>,
    pub clock: Clock,
}

impl<R, G> Clone for WillRouterState<R, G> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
            clock: self.clock,
        }
    }
}

impl<R, G> WillRouterState<R, G> {
    pub fn new(service: Arc<WillService<R>>, auth: Arc<G>) -> Self {
        Self {
            service,
            auth,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Router exposing will drafting, stored-record management and auth endpoints.
pub fn will_router<R, G>(state: WillRouterState<R, G>) -> Router
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    Router::new()
        .route("/api/v1/wills/preview", post(preview_handler::<R, G>))
        .route(
            "/api/v1/wills",
            post(submit_handler::<R, G>).get(list_handler::<R, G>),
        )
        .route(
            "/api/v1/wills/:id",
            get(get_handler::<R, G>)
                .put(resubmit_handler::<R, G>)
                .delete(delete_handler::<R, G>),
        )
        .route(
            "/api/v1/wills/:id/document",
            get(document_handler::<R, G>),
        )
        .route(
            "/api/v1/inheritance/distribution",
            post(distribution_handler::<R, G>),
        )
        .route("/api/v1/auth/sign-in", post(sign_in_handler::<R, G>))
        .route("/api/v1/auth/sign-up", post(sign_up_handler::<R, G>))
        .route("/api/v1/auth/sign-out", post(sign_out_handler::<R, G>))
        .route("/api/v1/auth/user", get(user_handler::<R, G>))
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
}

async fn session_context<G>(auth: &G, headers: &HeaderMap) -> Result<SessionContext, Response>
where
    G: AuthGateway,
{
    session_from_token(auth, bearer_token(headers))
        .await
        .map_err(auth_error_response)
}

fn generic_failure() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": GENERIC_FAILURE })),
    )
        .into_response()
}

pub(crate) fn service_error_response(err: WillServiceError) -> Response {
    match err {
        WillServiceError::Validation(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        WillServiceError::Unauthenticated
        | WillServiceError::Repository(RepositoryError::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Debes iniciar sesión para acceder a tus testamentos." })),
        )
            .into_response(),
        WillServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Testamento no encontrado." })),
        )
            .into_response(),
        WillServiceError::Repository(other) => {
            error!(error = %other, "persistence gateway failure");
            generic_failure()
        }
        WillServiceError::Distribution(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) fn auth_error_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => {
            warn!("rejected sign-in attempt");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
        AuthError::WeakPassword | AuthError::PasswordMismatch | AuthError::InvalidEmail => {
            let field = match err {
                AuthError::InvalidEmail => "email",
                AuthError::PasswordMismatch => "password_confirmation",
                _ => "password",
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": [{ "field": field, "message": err.to_string() }] })),
            )
                .into_response()
        }
        AuthError::Rejected { .. } | AuthError::Unavailable(_) => {
            error!(error = %err, "identity gateway failure");
            generic_failure()
        }
    }
}

/// ASCII-only stand-in for header parameters that cannot carry UTF-8.
fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn document_response(document: RenderedWill, record_id: Option<RecordId>) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(document.content_type.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&document.filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(id) = record_id {
        if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
            headers.insert(HeaderName::from_static(RECORD_ID_HEADER), value);
        }
    }
    (StatusCode::OK, headers, document.bytes).into_response()
}

pub(crate) async fn preview_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Json(submission): Json<WillSubmission>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    match state.service.preview(&submission, (state.clock)()) {
        Ok(html) => Html(html).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn submit_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    headers: HeaderMap,
    Json(submission): Json<WillSubmission>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .service
        .submit(&session, &submission, (state.clock)())
        .await
    {
        Ok(submitted) => {
            let record_id = submitted.record.as_ref().map(|record| record.id);
            document_response(submitted.document, record_id)
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn resubmit_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(submission): Json<WillSubmission>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .service
        .resubmit(&session, RecordId(id), &submission, (state.clock)())
        .await
    {
        Ok(submitted) => {
            let record_id = submitted.record.as_ref().map(|record| record.id);
            document_response(submitted.document, record_id)
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn list_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.service.list(&session).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn get_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.service.get(&session, RecordId(id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn delete_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.service.delete(&session, RecordId(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocumentQuery {
    #[serde(default)]
    format: Option<String>,
}

pub(crate) async fn document_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let mode = match query.format.as_deref() {
        None => OutputMode::Printable,
        Some(raw) => match OutputMode::parse(raw) {
            Some(mode) => mode,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("formato no soportado: {raw}") })),
                )
                    .into_response()
            }
        },
    };

    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .service
        .render_record(&session, RecordId(id), mode, (state.clock)())
        .await
    {
        Ok(document) => document_response(document, Some(RecordId(id))),
        Err(err) => service_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistributionRequest {
    #[serde(rename = "beneficiarios")]
    beneficiaries: Vec<Beneficiary>,
    #[serde(rename = "total_bienes")]
    total_estate_value: f64,
}

pub(crate) async fn distribution_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Json(request): Json<DistributionRequest>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    match state
        .service
        .distribution(&request.beneficiaries, request.total_estate_value)
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => service_error_response(err),
    }
}

#[derive(Debug, Serialize)]
struct SessionView<'a> {
    access_token: &'a str,
    user: &'a super::auth::AuthUser,
}

fn session_view(session: &AuthSession) -> SessionView<'_> {
    SessionView {
        access_token: &session.access_token,
        user: &session.user,
    }
}

pub(crate) async fn sign_in_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Json(credentials): Json<Credentials>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    match state.auth.sign_in(&credentials).await {
        Ok(session) => (StatusCode::OK, Json(session_view(&session))).into_response(),
        Err(err) => auth_error_response(err),
    }
}

pub(crate) async fn sign_up_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    Json(request): Json<SignUpRequest>,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let credentials = match request.credentials() {
        Ok(credentials) => credentials,
        Err(err) => return auth_error_response(err),
    };

    match state.auth.sign_up(&credentials).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            (StatusCode::CREATED, Json(session_view(&session))).into_response()
        }
        Ok(SignUpOutcome::ConfirmationPending { email }) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "confirmation_pending", "email": email })),
        )
            .into_response(),
        Err(err) => auth_error_response(err),
    }
}

pub(crate) async fn sign_out_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    let session = match session_context(state.auth.as_ref(), &headers).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session {
        SessionContext::Authenticated(session) => match state.auth.sign_out(&session).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => auth_error_response(err),
        },
        SessionContext::Anonymous => StatusCode::NO_CONTENT.into_response(),
    }
}

pub(crate) async fn user_handler<R, G>(
    State(state): State<WillRouterState<R, G>>,
    headers: HeaderMap,
) -> Response
where
    R: WillRepository + 'static,
    G: AuthGateway + 'static,
{
    match session_context(state.auth.as_ref(), &headers).await {
        Ok(SessionContext::Authenticated(session)) => {
            (StatusCode::OK, Json(json!({ "user": session.user }))).into_response()
        }
        Ok(SessionContext::Anonymous) => service_error_response(WillServiceError::Unauthenticated),
        Err(response) => response,
    }
}
