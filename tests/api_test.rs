//! Integration tests for API endpoints.
//!
//! These tests drive the full router with fake services, so no database
//! connection is needed. Tokens are signed by the real issuer.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use cloudgames_users::api::metrics::setup_metrics_recorder;
use cloudgames_users::api::{create_router, AppState};
use cloudgames_users::config::{TokenSettings, ACCOUNT_NOT_FOUND, ACCOUNT_NOT_FOUND_FOR_STATUS};
use cloudgames_users::domain::{
    Account, AccountResponse, AccountRole, CreateAccountRequest, LoginRequest, Password,
    TokenResponse, UpdateAccountRequest,
};
use cloudgames_users::errors::{AppError, AppResult};
use cloudgames_users::services::{AccountService, JwtIssuer, ServiceContainer, TokenIssuer};

// =============================================================================
// Fake Services for Testing
// =============================================================================

fn administrator() -> Account {
    Account {
        id: 1,
        full_name: "Administrator".to_string(),
        login: "administrator".to_string(),
        password: Password::hash("123456").into_string(),
        email: "adm@adm.com".to_string(),
        role: AccountRole::Admin,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2025, 5, 30, 12, 50, 51).unwrap(),
    }
}

/// Account service that knows only the seeded administrator
struct FakeAccounts {
    tokens: Arc<dyn TokenIssuer>,
}

impl FakeAccounts {
    fn require(id: i32, message: &str) -> AppResult<Account> {
        if id == 1 {
            Ok(administrator())
        } else {
            Err(AppError::not_found(message))
        }
    }
}

#[async_trait]
impl AccountService for FakeAccounts {
    async fn create(&self, request: CreateAccountRequest) -> AppResult<AccountResponse> {
        let mut account = request.into_account(Utc::now());
        account.id = 2;
        Ok(AccountResponse::from(account))
    }

    async fn update(&self, request: UpdateAccountRequest) -> AppResult<()> {
        Self::require(request.id, ACCOUNT_NOT_FOUND).map(|_| ())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        Self::require(id, ACCOUNT_NOT_FOUND).map(|_| ())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<AccountResponse>> {
        Ok(Self::require(id, ACCOUNT_NOT_FOUND)
            .ok()
            .map(AccountResponse::from))
    }

    async fn get_by_email(&self, email: String) -> AppResult<Option<AccountResponse>> {
        let admin = administrator();
        Ok(admin
            .email
            .eq_ignore_ascii_case(&email)
            .then(|| AccountResponse::from(admin)))
    }

    async fn get_all(&self) -> AppResult<Vec<AccountResponse>> {
        Ok(vec![AccountResponse::from(administrator())])
    }

    async fn activate(&self, id: i32) -> AppResult<()> {
        Self::require(id, ACCOUNT_NOT_FOUND_FOR_STATUS).map(|_| ())
    }

    async fn deactivate(&self, id: i32) -> AppResult<()> {
        Self::require(id, ACCOUNT_NOT_FOUND_FOR_STATUS).map(|_| ())
    }

    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let admin = administrator();
        let hash = Password::hash(&request.password).into_string();
        if request.email != admin.email || hash != admin.password {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&request.email, admin.role.display_name())?;
        Ok(TokenResponse::issued(token))
    }
}

/// Container handing out fake account services
struct FakeServices {
    tokens: Arc<dyn TokenIssuer>,
    database_up: bool,
}

#[async_trait]
impl ServiceContainer for FakeServices {
    async fn accounts(&self, cancel: CancellationToken) -> AppResult<Arc<dyn AccountService>> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(Arc::new(FakeAccounts {
            tokens: self.tokens.clone(),
        }))
    }

    fn tokens(&self) -> Arc<dyn TokenIssuer> {
        self.tokens.clone()
    }

    async fn ping(&self) -> AppResult<()> {
        if self.database_up {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn issuer() -> Arc<dyn TokenIssuer> {
    Arc::new(JwtIssuer::new(TokenSettings {
        secret: "test-secret-key-for-testing-only-32chars".to_string(),
        issuer: "cloudgames-users".to_string(),
    }))
}

fn app_with(database_up: bool, shutdown: CancellationToken) -> Router {
    let services = Arc::new(FakeServices {
        tokens: issuer(),
        database_up,
    });
    create_router(AppState::new(services, shutdown))
}

fn app() -> Router {
    app_with(true, CancellationToken::new())
}

fn token_for(role: &str) -> String {
    issuer().issue("someone@adm.com", role).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_account() -> Value {
    json!({
        "fullName": "Player One Account",
        "login": "playerone01",
        "password": "Str0ng@Pass",
        "email": "player@cloudgames.com",
        "role": 2,
        "isActive": true
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_login_returns_verifiable_token() {
    let response = app()
        .oneshot(request(
            "POST",
            "/authentication/login",
            None,
            Some(json!({"email": "adm@adm.com", "password": "123456"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let token: TokenResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert!(token.authenticated);

    let claims = issuer().verify(&token.token).unwrap();
    assert_eq!(claims.sub, "adm@adm.com");
    assert!(claims.is_admin());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let response = app()
        .oneshot(request(
            "POST",
            "/authentication/login",
            None,
            Some(json!({"email": "adm@adm.com", "password": "wrong"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(
        body["error"]["message"],
        "The specified email or password are incorrect."
    );
}

#[tokio::test]
async fn test_login_with_malformed_email_is_rejected() {
    let response = app()
        .oneshot(request(
            "POST",
            "/authentication/login",
            None,
            Some(json!({"email": "not-an-email", "password": "123456"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_token() {
    let response = app()
        .oneshot(request("GET", "/users", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_invalid_token() {
    let response = app()
        .oneshot(request("GET", "/users", Some("not-a-jwt"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbid_user_role() {
    let token = token_for("user");
    let response = app()
        .oneshot(request("GET", "/users", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_non_admin_is_forbidden_before_body_is_read() {
    let token = token_for("user");
    let mut req = request("PUT", "/users/1", Some(&token), None);
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    *req.body_mut() = Body::from("{not json");

    let response = app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_with_malformed_body_is_bad_request() {
    let token = token_for("admin");
    let mut req = request("PUT", "/users/1", Some(&token), None);
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    *req.body_mut() = Body::from("{not json");

    let response = app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_accounts_as_admin() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("GET", "/users", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let accounts: Vec<AccountResponse> =
        serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].role_code, 1);
}

#[tokio::test]
async fn test_get_missing_account_is_not_found() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("GET", "/users/99", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["message"], ACCOUNT_NOT_FOUND);
}

#[tokio::test]
async fn test_get_account_by_email_ignores_case() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("GET", "/users/email/ADM@adm.com", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email"], "adm@adm.com");
}

#[tokio::test]
async fn test_create_account_is_anonymous() {
    let response = app()
        .oneshot(request("POST", "/users", None, Some(valid_account())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["roleCode"], 2);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_account_with_weak_password_is_rejected() {
    let mut payload = valid_account();
    payload["password"] = json!("weakpassword");

    let response = app()
        .oneshot(request("POST", "/users", None, Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_uses_path_id() {
    let token = token_for("admin");
    let mut payload = valid_account();
    payload["id"] = json!(1);

    let response = app()
        .oneshot(request("PUT", "/users/5", Some(&token), Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_existing_account() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("PUT", "/users/1", Some(&token), Some(valid_account())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account_returns_no_content() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("DELETE", "/users/1", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_deactivate_missing_account_is_not_found() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("PUT", "/users/42/inactive", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"]["message"],
        ACCOUNT_NOT_FOUND_FOR_STATUS
    );
}

#[tokio::test]
async fn test_activate_account() {
    let token = token_for("admin");
    let response = app()
        .oneshot(request("PUT", "/users/1/active", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_requests_after_shutdown_are_unavailable() {
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let response = app_with(true, shutdown)
        .oneshot(request("POST", "/users", None, Some(valid_account())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Correlation ids and health
// =============================================================================

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let mut req = request("GET", "/health", None, None);
    req.headers_mut()
        .insert("x-correlation-id", "trace-me-123".parse().unwrap());

    let response = app().oneshot(req).await.unwrap();

    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "trace-me-123"
    );
}

#[tokio::test]
async fn test_correlation_id_is_generated_when_absent() {
    let response = app()
        .oneshot(request("GET", "/users", None, None))
        .await
        .unwrap();

    let id = response.headers().get("x-correlation-id").unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_health_reports_database_status() {
    let healthy = app()
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(healthy.status(), StatusCode::OK);

    let degraded = app_with(false, CancellationToken::new())
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(degraded).await["database"]["status"], "unhealthy");
}

// =============================================================================
// Metrics
// =============================================================================

/// The global recorder can only be installed once per test binary
static RECORDER: Lazy<PrometheusHandle> = Lazy::new(|| setup_metrics_recorder().unwrap());

#[tokio::test]
async fn test_metrics_count_requests_by_route() {
    let services = Arc::new(FakeServices {
        tokens: issuer(),
        database_up: true,
    });
    let state = AppState::new(services, CancellationToken::new()).with_metrics(RECORDER.clone());
    let app = create_router(state);

    let token = token_for("admin");
    let response = app
        .clone()
        .oneshot(request("GET", "/users/1", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests_total{"));
    assert!(text.contains("path=\"/users/:id\""));
    assert!(text.contains("http_requests_duration_seconds_bucket"));
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let response = app()
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
