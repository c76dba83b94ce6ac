//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the account from a JWT Bearer token.

pub mod auth;
