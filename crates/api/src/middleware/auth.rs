//! Account extractor for document handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use downnote_core::error::CoreError;
use downnote_core::types::DbId;

use crate::auth::jwt::authenticate;
use crate::error::AppError;
use crate::state::AppState;

/// The account a request acts for. Every document lookup is scoped to
/// `user_id`, so a foreign document looks exactly like a missing one.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(&parts.headers, &state.config.jwt) {
            Ok(user_id) => Ok(AuthUser { user_id }),
            Err(e) => {
                tracing::debug!(uri = %parts.uri, error = %e, "Rejected unauthenticated request");
                Err(AppError::Core(CoreError::Unauthorized(e.to_string())))
            }
        }
    }
}
