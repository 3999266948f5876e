//! Bearer-token extractors.
//!
//! Handlers take [`AuthUser`] or [`AdminUser`] as an argument; the token is
//! verified and the account reloaded from the store on every request, so a
//! deleted or demoted user loses access immediately.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::Claims;
use crate::error::AppError;
use crate::models::user::{User, UserRole};
use crate::state::AppState;
use crate::store;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An authenticated caller whose token and stored row both carry the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

fn unauthorized(msg: &str) -> AppError {
    AppError::Unauthorized(msg.to_string())
}

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Authorization header is required"))?;
    let value = header.to_str().map_err(|_| unauthorized("Invalid authorization header format"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid authorization header format"))?
        .trim();
    if token.is_empty() {
        return Err(unauthorized("Token is required"));
    }
    Ok(state.jwt.decode(token)?)
}

async fn load_user(state: &AppState, claims: &Claims) -> Result<User, AppError> {
    store::user::find_by_id(&state.db, &claims.sub).await?.ok_or_else(|| unauthorized("User not found"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        let user = load_user(state, &claims).await?;
        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        if claims.role != UserRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        let user = load_user(state, &claims).await?;
        // The token may predate a demotion
        if user.role != UserRole::Admin {
            tracing::warn!(user_id = %user.id, "Admin token presented by non-admin account");
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
