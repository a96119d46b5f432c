use axum::Json;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use liftlog::db::models::NewUser;
use liftlog::db::operations::{create_user, find_user_by_email};
use liftlog::validate::str_field;

use crate::AppState;
use crate::auth::{TOKEN_COOKIE, issue_token};
use crate::error::ApiError;

pub async fn signup(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (Some(name), Some(surname), Some(email), Some(password)) = (
        str_field(&data, "name"),
        str_field(&data, "surname"),
        str_field(&data, "email"),
        str_field(&data, "password"),
    ) else {
        return Err(ApiError::BadRequest(
            "Name, surname, email and password are required.".to_string(),
        ));
    };

    if find_user_by_email(&state.pool, email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "User already exists. Please login.".to_string(),
        ));
    }

    // bcrypt is deliberately slow; keep it off the async worker threads.
    let password = password.to_string();
    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|_| ApiError::Internal)?
            .map_err(|_| ApiError::Internal)?;

    create_user(
        &state.pool,
        &NewUser {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await?;

    Ok(Json(json!({
        "message": "You have registered successfully, please proceed to log in."
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (str_field(&data, "email"), str_field(&data, "password"))
    else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    // A missing user and a wrong password get the same answer.
    let Some(user) = find_user_by_email(&state.pool, email).await? else {
        return Err(ApiError::Auth("Invalid credentials".to_string()));
    };

    let password = password.to_string();
    let hash = user.password_hash.clone();
    let verified =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|_| ApiError::Internal)?;
    if !verified {
        return Err(ApiError::Auth("Invalid credentials".to_string()));
    }

    let token = issue_token(user.id, &state.config.secret_key).map_err(|_| ApiError::Internal)?;

    let mut response = Json(json!({
        "message": "Logged in successfully",
        "token": token,
    }))
    .into_response();
    let cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|_| ApiError::Internal)?,
    );
    Ok(response)
}

/// Idempotent: tokens are stateless, so logout just tells the client to
/// drop the cookie by expiring it at the epoch.
pub async fn logout() -> Result<Response, ApiError> {
    let mut response = Json(json!({ "message": "Logged out successfully" })).into_response();
    let cookie = format!(
        "{TOKEN_COOKIE}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict"
    );
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|_| ApiError::Internal)?,
    );
    Ok(response)
}
