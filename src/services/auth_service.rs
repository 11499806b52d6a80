use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use crate::api::{Validate, Validator};
use crate::auth::{issue_tokens, validate_token, verify_password, AuthError, TokenKind, TokenPair};
use crate::config::SecurityConfig;
use crate::database::models::UserCredentials;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SignInRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("email", Some(&self.email))
            .email("email", Some(&self.email))
            .required("password", Some(&self.password))
            .length("password", Some(&self.password), 6, 20)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("refresh_token", Some(&self.refresh_token))
            .finish()
    }
}

const CREDENTIALS_BY_EMAIL: &str =
    r#"SELECT "id", "role", "status", "password" FROM "users" WHERE "email" = $1 AND "deleted_at" IS NULL"#;
const CREDENTIALS_BY_ID: &str =
    r#"SELECT "id", "role", "status", "password" FROM "users" WHERE "id" = $1 AND "deleted_at" IS NULL"#;

pub struct AuthService<'a> {
    pool: &'a PgPool,
    security: &'a SecurityConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            pool: state.db.pool(),
            security: &state.config.security,
        }
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair, ApiError> {
        let email = request.email.trim().to_lowercase();
        let user = self.by_email(&email).await?;

        let user = match user {
            Some(user) if user.status && verify_password(&request.password, &user.password) => user,
            _ => {
                info!("rejected sign-in for {}", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        Ok(issue_tokens(self.security, user.id, user.role)?)
    }

    /// Exchanges a refresh token for a new pair, re-reading the user's role
    pub async fn refresh(&self, request: &RefreshRequest) -> Result<TokenPair, ApiError> {
        let claims = validate_token(self.security, &request.refresh_token, TokenKind::Refresh)?;

        match self.by_id(claims.sub).await? {
            Some(user) if user.status => Ok(issue_tokens(self.security, user.id, user.role)?),
            _ => Err(ApiError::unauthorized("User no longer exists or is inactive")),
        }
    }

    async fn by_email(&self, email: &str) -> Result<Option<UserCredentials>, ApiError> {
        sqlx::query_as::<_, UserCredentials>(CREDENTIALS_BY_EMAIL)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(lookup_failed)
    }

    async fn by_id(&self, id: i64) -> Result<Option<UserCredentials>, ApiError> {
        sqlx::query_as::<_, UserCredentials>(CREDENTIALS_BY_ID)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(lookup_failed)
    }
}

fn lookup_failed(err: sqlx::Error) -> ApiError {
    error!("credential lookup failed: {}", err);
    ApiError::from(DatabaseError::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_requires_email_and_password_bounds() {
        let bad = SignInRequest {
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);

        let good = SignInRequest {
            email: "editor@example.com".into(),
            password: "secret123".into(),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn refresh_requires_a_token() {
        let err = RefreshRequest { refresh_token: String::new() }.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
