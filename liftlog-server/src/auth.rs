//! Auth gate: every protected handler takes a `CurrentUser` extractor,
//! which resolves the bearer credential to a `users` row or rejects the
//! request with 401 before any handler logic runs.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use liftlog::db::models::User;
use liftlog::db::operations::find_user_by_id;

use crate::AppState;
use crate::error::ApiError;

pub const TOKEN_COOKIE: &str = "jwt_token";
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: usize,
}

/// Sign a token for `user_id`, valid for 24 hours. Tokens are stateless:
/// logout only clears the client cookie, nothing is revoked server-side.
pub fn issue_token(user_id: i64, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    encode(
        &Header::default(),
        &Claims { id: user_id, exp },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// The authenticated user, injected into handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// `Authorization: Bearer` header, if present and well-formed.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// `jwt_token` cookie, if present.
fn cookie_token(parts: &Parts) -> Option<String> {
    for header in parts.headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == TOKEN_COOKIE && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Header takes precedence over the cookie when both are present.
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Auth("Token is missing!".to_string()))?;

        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.config.secret_key.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::Auth("Token has expired!".to_string()),
            _ => ApiError::Auth("Token is invalid!".to_string()),
        })?
        .claims;

        let user = find_user_by_id(&state.pool, claims.id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Auth("User not found".to_string()))?;

        Ok(CurrentUser(user))
    }
}
