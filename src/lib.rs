//! CloudGames users - Account lifecycle and authentication service
//!
//! Registers, updates, activates, deactivates and removes the user accounts
//! of the CloudGames catalog, and issues signed bearer tokens at login.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Accounts, roles, password hashing, request and response shapes
//! - **services**: Account use cases and token issuance
//! - **infra**: Database, migrations, repositories, unit of work
//! - **api**: HTTP handlers, middleware, and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, AccountRole, Password};
pub use errors::{AppError, AppResult};
