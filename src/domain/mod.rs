//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! DDD: Domain layer has NO external dependencies (except error types).
//! Contains: Entities, Value Objects, request and response shapes.

pub mod account;
pub mod password;

pub use account::{
    Account, AccountFilter, AccountResponse, AccountRole, CreateAccountRequest, LoginRequest,
    TokenResponse, UpdateAccountRequest,
};
pub use password::Password;
