use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use diary_core::auth::{verify_token, JwtConfig};

use crate::{ApiError, ApiResult};

const AUTHENTICATE_BEARER_CHALLENGE: &str = r#"Bearer realm="diary-api""#;

/// Verified caller identity. The raw token is kept so detail reads can
/// forward it to the user service unchanged.
#[derive(Debug, Clone)]
pub(crate) struct AuthContext {
    pub user_id: i64,
    pub token: String,
}

pub(crate) fn require_auth(jwt_config: &JwtConfig, headers: &HeaderMap) -> ApiResult<AuthContext> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| auth_required_error("missing token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| auth_required_error("invalid token"))?;
    let claims =
        verify_token(token, jwt_config).map_err(|err| auth_required_error(err.to_string()))?;
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| auth_required_error("token subject is not a user id"))?;
    Ok(AuthContext {
        user_id,
        token: token.to_string(),
    })
}

fn auth_required_error(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", message).with_header(
        "WWW-Authenticate",
        AUTHENTICATE_BEARER_CHALLENGE.to_string(),
    )
}
