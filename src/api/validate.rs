use std::collections::HashMap;

use crate::error::ApiError;

/// Field-level checks on a request body, run before anything touches storage
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Collects the first failure per field, then turns them into one 400
#[derive(Debug, Default)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_insert(message);
    }

    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.map(str::trim).map_or(true, str::is_empty) {
            self.fail(field, "This field is required".to_string());
        }
        self
    }

    /// Character-length bounds; skipped when the value is absent
    pub fn length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) -> &mut Self {
        if let Some(v) = value {
            let len = v.chars().count();
            if len < min {
                self.fail(field, format!("Must be at least {} characters", min));
            } else if len > max {
                self.fail(field, format!("Must be at most {} characters", max));
            }
        }
        self
    }

    pub fn min(&mut self, field: &str, value: Option<i64>, min: i64) -> &mut Self {
        if let Some(v) = value {
            if v < min {
                self.fail(field, format!("Must be at least {}", min));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            let valid = v
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
            if !valid {
                self.fail(field, "Must be a valid email address".to_string());
            }
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation_error(
            "Validation failed",
            Some(std::mem::take(&mut self.errors)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(result: Result<(), ApiError>) -> HashMap<String, String> {
        match result {
            Err(ApiError::ValidationError { field_errors: Some(errors), .. }) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn passes_when_every_rule_holds() {
        let result = Validator::new()
            .required("name", Some("Editor"))
            .length("name", Some("Editor"), 3, 100)
            .min("status_id", Some(1), 1)
            .email("email", Some("a@b.io"))
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn reports_each_failing_field_once() {
        let errors = field_errors(
            Validator::new()
                .required("name", Some("  "))
                .length("name", Some("  "), 3, 100)
                .min("status_id", Some(0), 1)
                .email("email", Some("nope"))
                .finish(),
        );
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["name"], "This field is required");
        assert_eq!(errors["status_id"], "Must be at least 1");
    }

    #[test]
    fn length_counts_characters() {
        assert!(Validator::new().length("title", Some("ñññ"), 3, 3).finish().is_ok());
        let errors = field_errors(Validator::new().length("title", Some("toolong"), 1, 3).finish());
        assert_eq!(errors["title"], "Must be at most 3 characters");
    }

    #[test]
    fn optional_rules_skip_absent_values() {
        assert!(Validator::new()
            .length("name", None, 3, 100)
            .min("order", None, 0)
            .email("email", None)
            .finish()
            .is_ok());
    }
}
