//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! Each account service is bound to one transaction scope through the
//! Unit of Work pattern.

mod account_service;
pub mod container;
mod token_issuer;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use token_issuer::{Claims, JwtIssuer, TokenIssuer};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use token_issuer::MockTokenIssuer;
