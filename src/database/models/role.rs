use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::{Validate, Validator};
use crate::database::manager::DatabaseError;
use crate::database::schema::{Entity, Schema};
use crate::error::ApiError;
use crate::filter::{SortDirection, SqlParam, StatusKind};

pub static ROLE_SCHEMA: Schema = Schema {
    table: "roles",
    list_name: "roles",
    singular: "role",
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
pub struct Role {
    pub id: i64,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub status: Option<bool>,
}

fn default_status() -> bool {
    true
}

impl Validate for CreateRole {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("name", Some(self.name.trim()))
            .length("name", Some(self.name.trim()), 3, 100)
            .finish()
    }
}

impl Validate for UpdateRole {
    fn validate(&self) -> Result<(), ApiError> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        Validator::new().length("name", name, 3, 100).finish()
    }
}

pub struct Roles;

impl Entity for Roles {
    type Record = Role;
    type Create = CreateRole;
    type Update = UpdateRole;

    fn schema() -> &'static Schema {
        &ROLE_SCHEMA
    }

    fn create_values(input: &CreateRole) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        Ok(vec![
            ("name", SqlParam::from(input.name.trim())),
            ("status", SqlParam::from(input.status)),
        ])
    }

    fn update_values(current: &Role, patch: &UpdateRole) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_bounds_are_enforced() {
        assert!(CreateRole { name: "ab".into(), status: true }.validate().is_err());
        assert!(CreateRole { name: "x".repeat(101), status: true }.validate().is_err());
        assert!(CreateRole { name: "Admin".into(), status: true }.validate().is_ok());
        assert!(UpdateRole { name: Some("ab".into()), status: None }.validate().is_err());
    }

    #[test]
    fn padding_does_not_count_towards_length() {
        assert!(CreateRole { name: "  ab  ".into(), status: true }.validate().is_err());
        assert!(CreateRole { name: "   ".into(), status: true }.validate().is_err());
        assert!(UpdateRole { name: Some(" ab ".into()), status: None }.validate().is_err());

        let input = CreateRole { name: "  Editor ".into(), status: true };
        assert!(input.validate().is_ok());
        assert_eq!(Roles::create_values(&input).unwrap()[0], ("name", SqlParam::from("Editor")));
    }

    #[test]
    fn roles_are_hard_deleted() {
        assert!(!Roles::schema().soft_delete);
    }
}
