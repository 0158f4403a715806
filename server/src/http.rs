//! HTTP boundary.
//!
//! Thin axum handlers over `NotesService`. Handlers translate wire bodies to
//! domain calls and `ServiceError` to status codes; no authorization logic
//! lives here.
//!
//! # Routes
//!
//! | Method | Path                 | Auth   |
//! |--------|----------------------|--------|
//! | GET    | `/`                  | none   |
//! | GET    | `/homepage`          | none   |
//! | GET    | `/homepage/login`    | none   |
//! | POST   | `/homepage/login`    | none   |
//! | POST   | `/homepage/signup`   | none   |
//! | GET    | `/homepage/notes`    | bearer |
//! | POST   | `/notes`             | bearer |
//! | GET    | `/notes/{note_id}`   | bearer |
//! | PATCH  | `/notes/{note_id}`   | bearer |
//! | DELETE | `/notes/{note_id}`   | bearer |
//!
//! Login and signup accept a JSON body or `application/x-www-form-urlencoded`
//! form data with the same keys. Malformed bodies and query strings are
//! reported as 400 with the usual `{"detail": ...}` body.
//!
//! The `Authorization` header is never logged.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{
        FromRequest, Path, Query, Request, State,
        rejection::{FormRejection, JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::service::{NotesService, ServiceError};
use crate::types::{Note, NoteFields, NotePatch, Principal};

/// Page size when the client gives none.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Largest page a client may request.
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NotesService>,
}

impl AppState {
    #[must_use]
    pub fn new(service: NotesService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/homepage", get(homepage))
        .route("/homepage/login", get(login_help).post(login))
        .route("/homepage/signup", axum::routing::post(signup))
        .route("/homepage/notes", get(list_notes))
        .route("/notes", axum::routing::post(create_note))
        .route(
            "/notes/{note_id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SignupBody {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /notes`. A `null` field stores no value.
#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
    #[serde(default)]
    pub note_title: Option<String>,
    #[serde(default)]
    pub note_content: Option<String>,
}

/// Body of `PATCH /notes/{note_id}`.
///
/// An omitted key is `None` and leaves the field alone. An explicit `null` is
/// `Some(None)` and clears it.
#[allow(clippy::option_option)] // null and absent mean different things
#[derive(Debug, Default, Deserialize)]
pub struct NotePatchBody {
    #[serde(default, deserialize_with = "present")]
    pub note_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub note_content: Option<Option<String>>,
}

impl From<NotePatchBody> for NotePatch {
    fn from(body: NotePatchBody) -> Self {
        Self {
            title: body.note_title,
            content: body.note_content,
        }
    }
}

/// Only runs for keys that are present, so `null` becomes `Some(None)`.
#[allow(clippy::option_option)]
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenOut {
    pub access_token: String,
    pub token_type: String,
}

/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserOut {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub created_on: u64,
    pub last_update: u64,
}

impl From<&Principal> for UserOut {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.id.to_text(),
            user_name: principal.name.clone(),
            user_email: principal.email.clone(),
            created_on: principal.created_at_ms,
            last_update: principal.updated_at_ms,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteOut {
    pub note_id: String,
    pub user_id: String,
    pub note_title: Option<String>,
    pub note_content: Option<String>,
    pub created_on: u64,
    pub last_update: u64,
}

impl From<Note> for NoteOut {
    fn from(note: Note) -> Self {
        Self {
            note_id: note.id.to_text(),
            user_id: note.owner.to_text(),
            note_title: note.title,
            note_content: note.content,
            created_on: note.created_at_ms,
            last_update: note.updated_at_ms,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub detail: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::StorageUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Backend detail stays in the logs.
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(ErrorOut { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<FormRejection> for ServiceError {
    fn from(rejection: FormRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

/// A request body given either as JSON or as urlencoded form data.
///
/// Form data is chosen by an `application/x-www-form-urlencoded` content
/// type; anything else is decoded as JSON.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, a non-ASCII value, another scheme, or an empty token.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn require_principal(state: &AppState, headers: &HeaderMap) -> Result<Principal, ServiceError> {
    let token = extract_bearer_token(headers).ok_or_else(|| {
        tracing::debug!("request without a usable bearer token");
        ServiceError::Unauthenticated
    })?;
    state.service.authenticated_principal(token)
}

/// Run password hashing or verification off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("blocking task failed: {e}");
        ServiceError::Internal(e.to_string())
    })?
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Redirect {
    Redirect::temporary("/homepage")
}

async fn homepage() -> &'static str {
    "welcome, please login"
}

async fn login_help() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Use POST /homepage/login with {email, password} as JSON or form data.",
        "signup": {
            "url": "/homepage/signup",
            "method": "POST",
            "body_json_example": {
                "user_name": "Alice",
                "user_email": "a@x.com",
                "password": "pw",
                "confirm_password": "pw"
            }
        },
        "login": {
            "url": "/homepage/login",
            "method": "POST",
            "body_json_example": { "email": "a@x.com", "password": "pw" }
        }
    }))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
async fn login(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<LoginBody>,
) -> Result<Json<TokenOut>, ServiceError> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ServiceError::InvalidInput(
            "missing email or password".to_string(),
        ));
    };

    let service = Arc::clone(&state.service);
    let access_token = run_blocking(move || service.authenticate(email.trim(), &password)).await?;

    Ok(Json(TokenOut {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
async fn signup(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<SignupBody>,
) -> Result<(StatusCode, Json<UserOut>), ServiceError> {
    let (Some(name), Some(email), Some(password), Some(confirm_password)) = (
        non_empty(body.user_name),
        non_empty(body.user_email),
        non_empty(body.password),
        non_empty(body.confirm_password),
    ) else {
        return Err(ServiceError::InvalidInput(
            "missing one of required fields: user_name, user_email, password, confirm_password"
                .to_string(),
        ));
    };

    if password != confirm_password {
        return Err(ServiceError::InvalidInput(
            "password and confirm_password do not match".to_string(),
        ));
    }

    let service = Arc::clone(&state.service);
    let principal = run_blocking(move || service.register(&name, &email, &password)).await?;

    Ok((StatusCode::CREATED, Json(UserOut::from(&principal))))
}

async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<NoteOut>>, ServiceError> {
    let principal = require_principal(&state, &headers)?;
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let notes = state
        .service
        .list_owned_resources(&principal, limit, offset)?;
    Ok(Json(notes.into_iter().map(NoteOut::from).collect()))
}

async fn create_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteOut>), ServiceError> {
    let principal = require_principal(&state, &headers)?;
    let Json(body) = body?;
    let fields = NoteFields {
        title: body.note_title,
        content: body.note_content,
    };
    let note = state.service.create_resource(&principal, fields)?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

async fn get_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(note_id): Path<String>,
) -> Result<Json<NoteOut>, ServiceError> {
    let principal = require_principal(&state, &headers)?;
    let note = state.service.get_owned_resource(&note_id, &principal)?;
    Ok(Json(note.into()))
}

async fn update_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(note_id): Path<String>,
    body: Result<Json<NotePatchBody>, JsonRejection>,
) -> Result<Json<NoteOut>, ServiceError> {
    let principal = require_principal(&state, &headers)?;
    let Json(body) = body?;
    let note = state
        .service
        .update_owned_resource(&note_id, &principal, body.into())?;
    Ok(Json(note.into()))
}

async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(note_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let principal = require_principal(&state, &headers)?;
    state.service.delete_owned_resource(&note_id, &principal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{new_test_service, new_unavailable_service};
    use axum::body::Body;
    use axum::http::{HeaderValue, Uri};
    use serde::de::DeserializeOwned;

    fn state() -> AppState {
        let (service, _clock) = new_test_service();
        AppState::new(service)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        headers
    }

    async fn body_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn signup_body(email: &str, password: &str, confirm: &str) -> SignupBody {
        SignupBody {
            user_name: Some("Alice".to_string()),
            user_email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm_password: Some(confirm.to_string()),
        }
    }

    async fn signup_and_login(state: &AppState, email: &str) -> HeaderMap {
        let response = signup(
            State(state.clone()),
            JsonOrForm(signup_body(email, "pw1", "pw1")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = login(
            State(state.clone()),
            JsonOrForm(LoginBody {
                email: Some(email.to_string()),
                password: Some("pw1".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let token: TokenOut = body_json(response).await;
        assert_eq!(token.token_type, "bearer");
        bearer(&token.access_token)
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request")
    }

    async fn create(state: &AppState, headers: &HeaderMap, title: &str) -> NoteOut {
        let response = create_note(
            State(state.clone()),
            headers.clone(),
            Ok(Json(NoteBody {
                note_title: Some(title.to_string()),
                note_content: Some("body".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&bearer("abc")), Some("abc"));

        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ServiceError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (ServiceError::EmailTaken, StatusCode::CONFLICT),
            (
                ServiceError::StorageUnavailable("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge_header() {
        let response = ServiceError::Unauthenticated.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let response = ServiceError::StorageUnavailable("db at 10.0.0.3 refused".to_string())
            .into_response();
        let body: ErrorOut = body_json(response).await;
        assert_eq!(body.detail, "internal server error");
    }

    #[tokio::test]
    async fn test_root_and_homepage() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION),
            Some(&HeaderValue::from_static("/homepage"))
        );

        let response = homepage().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let help = login_help().await;
        assert!(help.0.get("signup").is_some());
        assert!(help.0.get("login").is_some());
    }

    #[tokio::test]
    async fn test_signup_rejects_mismatch_and_missing_fields() {
        let state = state();

        let response = signup(
            State(state.clone()),
            JsonOrForm(signup_body("a@x.com", "pw1", "pw2")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = signup(State(state.clone()), JsonOrForm(SignupBody::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_returns_user_without_password() {
        let state = state();
        let response = signup(
            State(state),
            JsonOrForm(signup_body("a@x.com", "pw1", "pw1")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let raw: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert!(raw.get("password_hash").is_none());

        let user: UserOut = serde_json::from_value(raw).expect("user");
        assert_eq!(user.user_email, "a@x.com");
        assert_eq!(user.user_id.len(), 36);
    }

    #[tokio::test]
    async fn test_signup_duplicate_is_conflict() {
        let state = state();
        signup_and_login(&state, "a@x.com").await;

        let response = signup(
            State(state),
            JsonOrForm(signup_body("a@x.com", "pw9", "pw9")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = state();
        signup_and_login(&state, "a@x.com").await;

        let response = login(
            State(state.clone()),
            JsonOrForm(LoginBody {
                email: Some("a@x.com".to_string()),
                password: Some("wrong".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = login(State(state), JsonOrForm(LoginBody::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_note_routes_require_bearer_token() {
        let state = state();
        let no_auth = HeaderMap::new();

        let response = list_notes(
            State(state.clone()),
            no_auth.clone(),
            Ok(Query(ListQuery::default())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = create_note(
            State(state.clone()),
            bearer("garbage"),
            Ok(Json(NoteBody::default())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = get_note(State(state), no_auth, Path("x".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_note_crud_round_trip() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;
        let note = create(&state, &alice, "Groceries").await;

        let response = get_note(
            State(state.clone()),
            alice.clone(),
            Path(note.note_id.clone()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: NoteOut = body_json(response).await;
        assert_eq!(fetched, note);

        let response = update_note(
            State(state.clone()),
            alice.clone(),
            Path(note.note_id.clone()),
            Ok(Json(NotePatchBody {
                note_title: None,
                note_content: Some(Some(String::new())),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let updated: NoteOut = body_json(response).await;
        assert_eq!(updated.note_title.as_deref(), Some("Groceries"));
        assert_eq!(updated.note_content.as_deref(), Some(""));

        let response = delete_note(
            State(state.clone()),
            alice.clone(),
            Path(note.note_id.clone()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get_note(State(state), alice, Path(note.note_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_note_is_not_found() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;
        let bob = signup_and_login(&state, "b@x.com").await;
        let note = create(&state, &alice, "private").await;

        for id in [note.note_id.clone(), "not-an-id".to_string()] {
            let response = get_note(State(state.clone()), bob.clone(), Path(id.clone()))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let response = delete_note(State(state.clone()), bob.clone(), Path(id))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        // Still there for Alice.
        let response = get_note(State(state), alice, Path(note.note_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_notes_paging_and_empty() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;

        let response = list_notes(
            State(state.clone()),
            alice.clone(),
            Ok(Query(ListQuery::default())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let notes: Vec<NoteOut> = body_json(response).await;
        assert!(notes.is_empty());

        for title in ["one", "two", "three"] {
            create(&state, &alice, title).await;
        }

        let response = list_notes(
            State(state.clone()),
            alice.clone(),
            Ok(Query(ListQuery {
                limit: Some(2),
                offset: None,
            })),
        )
        .await
        .into_response();
        let page: Vec<NoteOut> = body_json(response).await;
        assert_eq!(page.len(), 2);

        let response = list_notes(
            State(state),
            alice,
            Ok(Query(ListQuery {
                limit: Some(10_000),
                offset: Some(2),
            })),
        )
        .await
        .into_response();
        let rest: Vec<NoteOut> = body_json(response).await;
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let state = AppState::new(new_unavailable_service());
        let response = login(
            State(state),
            JsonOrForm(LoginBody {
                email: Some("a@x.com".to_string()),
                password: Some("pw1".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_login_and_signup_accept_form_data() {
        let state = state();
        let form = "application/x-www-form-urlencoded";

        let signup_form = request(
            form,
            "user_name=Alice&user_email=a%40x.com&password=pw1&confirm_password=pw1",
        );
        let body = JsonOrForm::<SignupBody>::from_request(signup_form, &())
            .await
            .expect("form body");
        let response = signup(State(state.clone()), body).await.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: UserOut = body_json(response).await;
        assert_eq!(user.user_email, "a@x.com");

        let login_form = request(form, "email=a%40x.com&password=pw1");
        let body = JsonOrForm::<LoginBody>::from_request(login_form, &())
            .await
            .expect("form body");
        let response = login(State(state.clone()), body).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let token: TokenOut = body_json(response).await;
        assert!(state.service.authenticated_principal(&token.access_token).is_ok());

        let empty_form = request(form, "email=&password=pw1");
        let body = JsonOrForm::<LoginBody>::from_request(empty_form, &())
            .await
            .expect("form body");
        let response = login(State(state), body).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_body_still_accepted() {
        let json = request("application/json", r#"{"email": "a@x.com", "password": "pw1"}"#);
        let JsonOrForm(body) = JsonOrForm::<LoginBody>::from_request(json, &())
            .await
            .expect("json body");
        assert_eq!(body.email.as_deref(), Some("a@x.com"));
        assert_eq!(body.password.as_deref(), Some("pw1"));
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_request_with_detail() {
        let cases = [
            request("application/json", "{not json"),
            request("text/plain", r#"{"email": "a@x.com"}"#),
            request("application/json", r#"{"email": 7}"#),
        ];
        for req in cases {
            let error = JsonOrForm::<LoginBody>::from_request(req, &())
                .await
                .expect_err("rejected");
            assert!(matches!(error, ServiceError::InvalidInput(_)));

            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: ErrorOut = body_json(response).await;
            assert!(!body.detail.is_empty());
        }
    }

    #[tokio::test]
    async fn test_note_body_rejection_is_bad_request() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;

        let rejection = Json::<NoteBody>::from_request(request("application/json", "[1,"), &())
            .await
            .expect_err("rejected");
        let response = create_note(State(state.clone()), alice.clone(), Err(rejection))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorOut = body_json(response).await;
        assert!(!body.detail.is_empty());

        let note = create(&state, &alice, "Groceries").await;
        let rejection = Json::<NotePatchBody>::from_request(request("application/json", "}"), &())
            .await
            .expect_err("rejected");
        let response = update_note(State(state), alice, Path(note.note_id), Err(rejection))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_list_query_is_bad_request() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;

        let uri: Uri = "/homepage/notes?limit=-1".parse().expect("uri");
        let rejection = Query::<ListQuery>::try_from_uri(&uri).expect_err("rejected");
        let response = list_notes(State(state), alice, Err(rejection))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorOut = body_json(response).await;
        assert!(!body.detail.is_empty());
    }

    #[test]
    fn test_patch_body_distinguishes_null_from_omitted() {
        let body: NotePatchBody =
            serde_json::from_str(r#"{"note_title": null}"#).expect("json");
        assert_eq!(body.note_title, Some(None));
        assert_eq!(body.note_content, None);

        let body: NotePatchBody =
            serde_json::from_str(r#"{"note_content": "x"}"#).expect("json");
        assert_eq!(body.note_title, None);
        assert_eq!(body.note_content, Some(Some("x".to_string())));

        let body: NotePatchBody = serde_json::from_str("{}").expect("json");
        assert_eq!(NotePatch::from(body), NotePatch::default());
    }

    #[tokio::test]
    async fn test_patch_with_null_clears_field() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;
        let note = create(&state, &alice, "Groceries").await;

        let body: NotePatchBody =
            serde_json::from_str(r#"{"note_content": null}"#).expect("json");
        let response = update_note(State(state), alice, Path(note.note_id), Ok(Json(body)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let updated: NoteOut = body_json(response).await;
        assert_eq!(updated.note_title.as_deref(), Some("Groceries"));
        assert_eq!(updated.note_content, None);
    }

    #[tokio::test]
    async fn test_overlong_fields_are_bad_request() {
        let state = state();
        let alice = signup_and_login(&state, "a@x.com").await;

        let response = create_note(
            State(state.clone()),
            alice,
            Ok(Json(NoteBody {
                note_title: Some("t".repeat(256)),
                note_content: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let mut body = signup_body("b@x.com", "pw1", "pw1");
        body.user_name = Some("n".repeat(151));
        let response = signup(State(state), JsonOrForm(body)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
