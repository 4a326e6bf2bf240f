//! API middleware.

mod auth;
mod correlation;

pub use auth::{AdminUser, CurrentUser};
pub use correlation::{correlation_middleware, CorrelationId};
