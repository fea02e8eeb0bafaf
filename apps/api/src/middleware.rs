use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tenura_core::AppError;
use tenura_domain::UserId;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the caller id set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the shared secret for internal routes.
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Caller identity attached to protected requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

pub async fn require_actor(mut request: Request, next: Next) -> ApiResult<Response> {
    let actor = actor_from_headers(request.headers())?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub async fn require_internal_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let presented = request
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !tokens_match(presented, &state.internal_api_token) {
        return Err(AppError::Unauthorized("internal token required".to_owned()).into());
    }

    Ok(next.run(request).await)
}

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    UserId::parse(raw)
        .map(Actor)
        .map_err(|_| AppError::Unauthorized("invalid caller identity".to_owned()))
}

// Constant time over the expected length.
pub(crate) fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() || expected.is_empty() {
        return false;
    }

    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
