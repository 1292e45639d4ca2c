//! Caller identity.
//!
//! Identity is asserted by the `x-user-id` header; there is no credential
//! check. Handlers that take [`AuthenticatedUser`] reject the request before
//! any business logic runs when the header is missing or blank.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::error::CheatoError;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user id of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = CheatoError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match user_id {
            Some(id) => Ok(Self(id.to_string())),
            None => {
                debug!(path = %parts.uri.path(), "Rejected request without user id");
                Err(CheatoError::unauthorized("User ID required"))
            }
        }
    }
}
