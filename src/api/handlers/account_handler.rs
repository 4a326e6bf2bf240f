//! Account management handlers.
//!
//! Registration is anonymous; everything else requires an admin token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};

use super::logged;
use crate::api::extractors::{validate, JsonBody, ValidatedJson};
use crate::api::middleware::{AdminUser, CorrelationId};
use crate::api::AppState;
use crate::config::ACCOUNT_NOT_FOUND;
use crate::domain::{AccountResponse, CreateAccountRequest, UpdateAccountRequest};
use crate::errors::{AppError, AppResult};

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_account).get(list_accounts))
        .route("/email/:email", get(get_account_by_email))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/:id/active", put(activate_account))
        .route("/:id/inactive", put(deactivate_account))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    correlation: CorrelationId,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    tracing::info!(correlation_id = %correlation, email = %payload.email, "Creating account");

    let result = async { state.accounts().await?.create(payload).await }.await;
    let account = logged(result, &correlation, "create_account")?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// List active accounts (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "Active accounts", body = Vec<AccountResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
) -> AppResult<Json<Vec<AccountResponse>>> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        "Listing active accounts"
    );

    let result = async { state.accounts().await?.get_all().await }.await;
    Ok(Json(logged(result, &correlation, "list_accounts")?))
}

/// Get account by ID (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(id): Path<i32>,
) -> AppResult<Json<AccountResponse>> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        account_id = id,
        "Fetching account"
    );

    let result = async {
        state
            .accounts()
            .await?
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ACCOUNT_NOT_FOUND))
    }
    .await;

    Ok(Json(logged(result, &correlation, "get_account")?))
}

/// Get account by email, ignoring case (admin only)
#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_account_by_email(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(email): Path<String>,
) -> AppResult<Json<AccountResponse>> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        email = %email,
        "Fetching account by email"
    );

    let result = async {
        state
            .accounts()
            .await?
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(ACCOUNT_NOT_FOUND))
    }
    .await;

    Ok(Json(logged(result, &correlation, "get_account_by_email")?))
}

/// Replace an account (admin only)
///
/// The id in the path overrides any id in the body.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(id): Path<i32>,
    JsonBody(mut payload): JsonBody<UpdateAccountRequest>,
) -> AppResult<StatusCode> {
    payload.id = id;
    validate(&payload)?;
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        account_id = id,
        "Updating account"
    );

    let result = async { state.accounts().await?.update(payload).await }.await;
    logged(result, &correlation, "update_account")?;

    Ok(StatusCode::OK)
}

/// Permanently delete an account (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        account_id = id,
        "Deleting account"
    );

    let result = async { state.accounts().await?.delete(id).await }.await;
    logged(result, &correlation, "delete_account")?;

    Ok(StatusCode::NO_CONTENT)
}

/// Allow an account to log in (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/active",
    tag = "Users",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account activated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        account_id = id,
        "Activating account"
    );

    let result = async { state.accounts().await?.activate(id).await }.await;
    logged(result, &correlation, "activate_account")?;

    Ok(StatusCode::OK)
}

/// Block an account from logging in (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/inactive",
    tag = "Users",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deactivated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    correlation: CorrelationId,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    tracing::info!(
        correlation_id = %correlation,
        admin = %admin.email,
        account_id = id,
        "Deactivating account"
    );

    let result = async { state.accounts().await?.deactivate(id).await }.await;
    logged(result, &correlation, "deactivate_account")?;

    Ok(StatusCode::OK)
}
