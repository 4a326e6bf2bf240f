//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};

use super::logged;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CorrelationId;
use crate::api::AppState;
use crate::domain::{LoginRequest, TokenResponse};
use crate::errors::AppResult;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/authentication/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account blocked")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    correlation: CorrelationId,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    tracing::info!(correlation_id = %correlation, email = %payload.email, "Login attempt");

    let result = async { state.accounts().await?.login(payload).await }.await;
    let token = logged(result, &correlation, "login")?;

    Ok(Json(token))
}
