//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler};
use crate::domain::{
    AccountResponse, CreateAccountRequest, LoginRequest, TokenResponse, UpdateAccountRequest,
};

/// OpenAPI documentation for the CloudGames users service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CloudGames Users",
        version = "0.1.0",
        description = "Account lifecycle and authentication for the CloudGames catalog",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::login,
        // Account endpoints
        account_handler::create_account,
        account_handler::list_accounts,
        account_handler::get_account,
        account_handler::get_account_by_email,
        account_handler::update_account,
        account_handler::delete_account,
        account_handler::activate_account,
        account_handler::deactivate_account,
    ),
    components(
        schemas(
            AccountResponse,
            CreateAccountRequest,
            UpdateAccountRequest,
            LoginRequest,
            TokenResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token issuance"),
        (name = "Users", description = "Account management operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /authentication/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_account_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/authentication/login"));
        assert!(doc.paths.paths.contains_key("/users/{id}/inactive"));
        assert!(doc.paths.paths.contains_key("/users/email/{email}"));
    }
}
