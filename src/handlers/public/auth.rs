// handlers/public/auth.rs - token acquisition, no authentication required

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::api::Validate;
use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthService, RefreshRequest, SignInRequest};
use crate::state::AppState;

/// POST /api/public/v1/auth/sign-in - exchange email and password for tokens
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    request.validate()?;

    let tokens = AuthService::new(&state).sign_in(&request).await?;
    Ok(ApiResponse::success("Signed in successfully", tokens))
}

/// POST /api/public/v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    request.validate()?;

    let tokens = AuthService::new(&state).refresh(&request).await?;
    Ok(ApiResponse::success("Token refreshed successfully", tokens))
}
