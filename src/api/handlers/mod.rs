//! HTTP request handlers.

pub mod account_handler;
pub mod auth_handler;

pub use account_handler::account_routes;
pub use auth_handler::auth_routes;

use crate::api::middleware::CorrelationId;
use crate::errors::AppResult;

/// Log the outcome of an operation under the request's correlation id.
fn logged<T>(result: AppResult<T>, correlation: &CorrelationId, operation: &str) -> AppResult<T> {
    match &result {
        Ok(_) => tracing::info!(correlation_id = %correlation, operation, "Operation succeeded"),
        Err(e) => tracing::warn!(
            correlation_id = %correlation,
            operation,
            error = %e,
            "Operation failed"
        ),
    }
    result
}
