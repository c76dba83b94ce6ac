//! Request handlers.
//!
//! Each submodule holds the async handlers for one resource. Handlers
//! authenticate through [`AuthUser`](crate::middleware::auth::AuthUser),
//! delegate to the core services and map errors via
//! [`AppError`](crate::error::AppError).

pub mod documents;
pub mod migration;
pub mod versions;
