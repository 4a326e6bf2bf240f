//! Bearer token authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// Caller identified by a verified bearer token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub email: String,
    pub role: String,
    admin: bool,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Caller holding the admin role.
///
/// Rejects before the request body is read, so a non-admin always gets 403
/// whatever the payload looks like.
#[derive(Clone, Debug)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.services.tokens().verify(token).map_err(|e| match e {
            AppError::Jwt(err) => {
                tracing::debug!(error = %err, "Rejected bearer token");
                AppError::Unauthorized
            }
            other => other,
        })?;

        Ok(CurrentUser {
            admin: claims.is_admin(),
            email: claims.email,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(AdminUser(user))
    }
}

/// Require admin role, returns Forbidden error if not admin.
fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::warn!(email = %user.email, role = %user.role, "Admin role required");
        Err(AppError::Forbidden)
    }
}
