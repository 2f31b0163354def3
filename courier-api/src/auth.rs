use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

/// Bearer token claims: `sub` is the caller identity the workflow checks
/// roles and ownership against.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CallerClaims {
    pub sub: String,
    pub exp: usize,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<CallerClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    identity: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/token", post(issue_token))
}

/// Issue a bearer token for an identity. Authentication proper (passwords,
/// SSO) is an external collaborator's concern; this endpoint stands in for
/// it the same way a guest login does.
async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = CallerClaims {
        sub: req.identity,
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Anyhow(anyhow::anyhow!("token encoding failed: {}", e)))?;

    Ok(Json(TokenResponse { token }))
}
