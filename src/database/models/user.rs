use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::{Validate, Validator};
use crate::auth::hash_password;
use crate::database::manager::DatabaseError;
use crate::database::schema::{Entity, Schema};
use crate::error::ApiError;
use crate::filter::{SortDirection, SqlParam, StatusKind};

/// Select list excludes `password`; sign-in reads it through `UserCredentials`.
pub static USER_SCHEMA: Schema = Schema {
    table: "users",
    list_name: "users",
    singular: "user",
    columns: &["id", "name", "email", "phone", "role", "status", "created_at", "updated_at"],
    search_column: "name",
    case_sensitive_search: false,
    status_column: "status",
    status_kind: StatusKind::Boolean,
    default_order: ("id", SortDirection::Desc),
    fixed_filters: &[],
    soft_delete: true,
    extra_cache_patterns: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<i64>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row used by sign-in only
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub role: Option<i64>,
    pub status: bool,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<i64>,
    #[serde(default = "default_status")]
    pub status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<i64>,
    pub status: Option<bool>,
}

fn default_status() -> bool {
    true
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("name", Some(self.name.trim()))
            .length("name", Some(self.name.trim()), 3, 100)
            .required("email", Some(self.email.trim()))
            .email("email", Some(self.email.trim()))
            .length("email", Some(self.email.trim()), 3, 191)
            .required("password", Some(&self.password))
            .length("password", Some(&self.password), 6, 20)
            .finish()
    }
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("name", self.name.as_deref().map(str::trim), 3, 100)
            .email("email", self.email.as_deref().map(str::trim))
            .length("email", self.email.as_deref().map(str::trim), 3, 191)
            .length("password", self.password.as_deref(), 6, 20)
            .finish()
    }
}

pub struct Users;

impl Entity for Users {
    type Record = User;
    type Create = CreateUser;
    type Update = UpdateUser;

    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn create_values(input: &CreateUser) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        Ok(vec![
            ("name", SqlParam::from(input.name.trim())),
            ("email", SqlParam::from(input.email.trim().to_lowercase())),
            ("password", SqlParam::from(hash_password(&input.password)?)),
            ("phone", SqlParam::from(input.phone.clone())),
            ("role", SqlParam::from(input.role)),
            ("status", SqlParam::from(input.status)),
        ])
    }

    fn update_values(current: &User, patch: &UpdateUser) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        let mut values = vec![
            ("name", SqlParam::from(patch.name.as_deref().map(str::trim).unwrap_or(&current.name))),
            (
                "email",
                SqlParam::from(
                    patch
                        .email
                        .as_deref()
                        .map(|e| e.trim().to_lowercase())
                        .unwrap_or_else(|| current.email.clone()),
                ),
            ),
            ("phone", SqlParam::from(patch.phone.clone().or_else(|| current.phone.clone()))),
            ("role", SqlParam::from(patch.role.or(current.role))),
            ("status", SqlParam::from(patch.status.unwrap_or(current.status))),
        ];
        if let Some(password) = &patch.password {
            values.push(("password", SqlParam::from(hash_password(password)?)));
        }
        Ok(values)
    }
}
