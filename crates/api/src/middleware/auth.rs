//! Authentication extractors.
//!
//! Handlers declare what they need in their signature:
//!
//! ```rust,ignore
//! async fn profile(RequireAuth(user): RequireAuth) -> Result<Json<...>> { ... }
//! async fn create_product(RequireAdmin(admin): RequireAdmin, ...) -> ... { ... }
//! async fn view_cart(owner: CartIdentity, ...) -> ... { ... }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::{CartOwner, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Header carrying a client-generated guest cart identifier.
pub const GUEST_ID_HEADER: &str = "x-guest-id";

const MAX_GUEST_ID_LENGTH: usize = 64;

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Guest ids are 1-64 characters of `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_guest_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_GUEST_ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extractor that requires a valid bearer token for an existing user.
///
/// Rejects with 401 when the header is missing, malformed, expired, or
/// refers to a deleted account.
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let user = AuthService::new(state.pool(), &state.config().jwt)
            .authenticate(token)
            .await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, any missing or bad token yields `None`.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Self(None));
        };

        match AuthService::new(state.pool(), &state.config().jwt)
            .authenticate(token)
            .await
        {
            Ok(user) => {
                set_sentry_user(&user.id, Some(user.email.as_str()));
                Ok(Self(Some(user)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
                Ok(Self(None))
            }
        }
    }
}

/// Extractor that requires an authenticated admin. 403 for other users.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Not authorized as an admin".to_string()));
        }
        Ok(Self(user))
    }
}

/// Whose cart a request operates on: the signed-in user, else the guest id.
///
/// Rejects with 400 when neither is present.
pub struct CartIdentity(pub CartOwner);

impl FromRequestParts<AppState> for CartIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(OptionalAuth(user)) = OptionalAuth::from_request_parts(parts, state).await;
        if let Some(user) = user {
            return Ok(Self(CartOwner::User(user.id)));
        }

        let guest_id = parts
            .headers
            .get(GUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest("Guest ID or authentication required".to_string()))?;

        if !is_valid_guest_id(guest_id) {
            return Err(AppError::BadRequest("Invalid guest ID".to_string()));
        }

        Ok(Self(CartOwner::Guest(guest_id.to_owned())))
    }
}
