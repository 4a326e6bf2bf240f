//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::Password;
use crate::config::{
    PASSWORD_SPECIAL_CHARACTERS, ROLE_ADMIN, ROLE_ADMIN_CODE, ROLE_USER, ROLE_USER_CODE,
};

/// Account roles, stored and exchanged as their integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AccountRole {
    Admin,
    #[default]
    User,
}

impl AccountRole {
    /// Stored integer code
    pub fn code(self) -> i32 {
        match self {
            AccountRole::Admin => ROLE_ADMIN_CODE,
            AccountRole::User => ROLE_USER_CODE,
        }
    }

    /// Name written into the `role` claim of issued tokens
    pub fn display_name(self) -> &'static str {
        match self {
            AccountRole::Admin => ROLE_ADMIN,
            AccountRole::User => ROLE_USER,
        }
    }
}

impl TryFrom<i32> for AccountRole {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            ROLE_ADMIN_CODE => Ok(AccountRole::Admin),
            ROLE_USER_CODE => Ok(AccountRole::User),
            other => Err(format!("unknown account role code {}", other)),
        }
    }
}

impl From<AccountRole> for i32 {
    fn from(role: AccountRole) -> Self {
        role.code()
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Account domain entity.
///
/// `password` always holds the stored (hashed) form. An `id` of zero marks an
/// account the store has not assigned an identifier to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub full_name: String,
    pub login: String,
    pub password: String,
    pub email: String,
    pub role: AccountRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Allow the account to log in
    pub fn activate(&mut self) {
        self.is_active = true;
    }

    /// Block the account from logging in
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Predicates the account store can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Exact identifier match
    Id(i32),
    /// Email match with both sides lower-cased
    EmailIgnoreCase(String),
    /// Only accounts allowed to log in
    Active,
}

impl AccountFilter {
    /// Evaluate the predicate against an in-memory account.
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            AccountFilter::Id(id) => account.id == *id,
            AccountFilter::EmailIgnoreCase(email) => {
                account.email.to_lowercase() == email.to_lowercase()
            }
            AccountFilter::Active => account.is_active,
        }
    }
}

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").unwrap());
static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").unwrap());
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").unwrap());

/// Require an uppercase letter, a lowercase letter, a digit and one of `@#&!.`.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let rule = |code: &'static str, message: &'static str| {
        Err(ValidationError::new(code).with_message(message.into()))
    };

    if !UPPERCASE.is_match(password) {
        return rule("password_uppercase", "Password must contain an uppercase letter");
    }
    if !LOWERCASE.is_match(password) {
        return rule("password_lowercase", "Password must contain a lowercase letter");
    }
    if !DIGIT.is_match(password) {
        return rule("password_digit", "Password must contain a digit");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c)) {
        return rule(
            "password_special",
            "Password must contain a special character (@#&!.)",
        );
    }
    Ok(())
}

/// Account creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Full name of the account holder
    #[validate(length(min = 10, max = 255, message = "Full name must be 10 to 255 characters"))]
    #[schema(example = "Administrator Account")]
    pub full_name: String,
    /// Login handle
    #[validate(length(min = 10, max = 20, message = "Login must be 10 to 20 characters"))]
    #[schema(example = "administrator")]
    pub login: String,
    /// Plaintext password, hashed before storage
    #[validate(
        length(min = 10, max = 20, message = "Password must be 10 to 20 characters"),
        custom(function = "validate_password_strength")
    )]
    #[schema(example = "Adm1n@Pass", min_length = 10, max_length = 20)]
    pub password: String,
    /// Email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[schema(example = "adm@adm.com")]
    pub email: String,
    /// Role code: 1 for admin, 2 for user
    #[serde(default)]
    #[schema(value_type = i32, example = 2)]
    pub role: AccountRole,
    /// Whether the account may log in right away
    #[serde(default)]
    pub is_active: bool,
}

impl CreateAccountRequest {
    /// Build the account to insert, hashing the plaintext password.
    pub fn into_account(self, created_at: DateTime<Utc>) -> Account {
        Account {
            id: 0,
            full_name: self.full_name,
            login: self.login,
            password: Password::hash(&self.password).into_string(),
            email: self.email,
            role: self.role,
            is_active: self.is_active,
            created_at,
        }
    }
}

/// Account replacement request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    /// Identifier of the account to replace
    #[serde(default)]
    #[validate(range(min = 1, message = "Id is invalid"))]
    #[schema(example = 1)]
    pub id: i32,
    /// Full name of the account holder
    #[validate(length(min = 10, max = 255, message = "Full name must be 10 to 255 characters"))]
    pub full_name: String,
    /// Login handle
    #[validate(length(min = 10, max = 20, message = "Login must be 10 to 20 characters"))]
    pub login: String,
    /// Password, stored as sent
    #[validate(
        length(min = 10, max = 20, message = "Password must be 10 to 20 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    /// Email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    /// Role code: 1 for admin, 2 for user
    #[serde(default)]
    #[schema(value_type = i32, example = 2)]
    pub role: AccountRole,
    #[serde(default)]
    pub is_active: bool,
}

impl UpdateAccountRequest {
    /// Build the replacement account, keeping the stored creation time.
    pub fn into_account(self, created_at: DateTime<Utc>) -> Account {
        Account {
            id: self.id,
            full_name: self.full_name,
            login: self.login,
            password: self.password,
            email: self.email,
            role: self.role,
            is_active: self.is_active,
            created_at,
        }
    }
}

/// Login credential pair
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Account email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[schema(example = "adm@adm.com")]
    pub email: String,
    /// Plaintext password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "123456")]
    pub password: String,
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Administrator")]
    pub full_name: String,
    #[schema(example = "administrator")]
    pub login: String,
    #[schema(example = "adm@adm.com")]
    pub email: String,
    /// Role code: 1 for admin, 2 for user
    #[schema(example = 1)]
    pub role_code: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name,
            login: account.login,
            email: account.email,
            role_code: account.role.code(),
            is_active: account.is_active,
            created_at: account.created_at,
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub authenticated: bool,
}

impl TokenResponse {
    pub fn issued(token: String) -> Self {
        Self {
            token,
            authenticated: true,
        }
    }
}
