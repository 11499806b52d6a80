use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::{Validate, Validator};
use crate::database::manager::DatabaseError;
use crate::database::schema::{Entity, Schema};
use crate::error::ApiError;
use crate::filter::{SortDirection, SqlParam, StatusKind};

pub static DESIGNATION_SCHEMA: Schema = Schema {
    table: "designations",
    list_name: "designations",
    singular: "designation",
    columns: &["id", "name", "status", "created_at", "updated_at"],
    search_column: "name",
    case_sensitive_search: false,
    status_column: "status",
    status_kind: StatusKind::Boolean,
    default_order: ("id", SortDirection::Desc),
    fixed_filters: &[],
    soft_delete: false,
    extra_cache_patterns: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Designation {
    pub id: i64,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDesignation {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDesignation {
    pub name: Option<String>,
    pub status: Option<bool>,
}

fn default_status() -> bool {
    true
}

impl Validate for CreateDesignation {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("name", Some(self.name.trim()))
            .length("name", Some(self.name.trim()), 3, 100)
            .finish()
    }
}

impl Validate for UpdateDesignation {
    fn validate(&self) -> Result<(), ApiError> {
        // empty name means "leave unchanged"
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        Validator::new().length("name", name, 3, 100).finish()
    }
}

pub struct Designations;

impl Entity for Designations {
    type Record = Designation;
    type Create = CreateDesignation;
    type Update = UpdateDesignation;

    fn schema() -> &'static Schema {
        &DESIGNATION_SCHEMA
    }

    fn create_values(input: &CreateDesignation) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        Ok(vec![
            ("name", SqlParam::from(input.name.trim())),
            ("status", SqlParam::from(input.status)),
        ])
    }

    fn update_values(current: &Designation, patch: &UpdateDesignation) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        let name = patch
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&current.name);
        Ok(vec![
            ("name", SqlParam::from(name)),
            ("status", SqlParam::from(patch.status.unwrap_or(current.status))),
        ])
    }
}
