use super::error::FilterError;
use super::types::{quote_identifier, FixedFilter, SqlParam, StatusKind};

/// Accumulates WHERE predicates and their bound values. Placeholders are
/// numbered in insertion order, so identical inputs give identical SQL.
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    conditions: Vec<String>,
    param_values: Vec<SqlParam>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed(&mut self, filter: &FixedFilter) -> &mut Self {
        match *filter {
            FixedFilter::IsTrue(column) => {
                self.conditions.push(format!("{} = TRUE", quote_identifier(column)));
            }
            FixedFilter::IsNull(column) => {
                self.conditions.push(format!("{} IS NULL", quote_identifier(column)));
            }
            FixedFilter::Equals(column, value) => {
                let placeholder = self.param(SqlParam::from(value));
                self.conditions.push(format!("{} = {}", quote_identifier(column), placeholder));
            }
        }
        self
    }

    pub fn not_deleted(&mut self) -> &mut Self {
        self.conditions.push("\"deleted_at\" IS NULL".to_string());
        self
    }

    /// Substring match; the term is bound, never spliced into the SQL text
    pub fn contains(&mut self, column: &str, term: &str, case_sensitive: bool) -> &mut Self {
        let operator = if case_sensitive { "LIKE" } else { "ILIKE" };
        let placeholder = self.param(SqlParam::from(format!("%{}%", escape_like(term))));
        self.conditions.push(format!("{} {} {}", quote_identifier(column), operator, placeholder));
        self
    }

    pub fn status(&mut self, column: &str, kind: StatusKind, raw: &str) -> Result<&mut Self, FilterError> {
        let value = parse_status(kind, raw)?;
        let placeholder = self.param(value);
        self.conditions.push(format!("{} = {}", quote_identifier(column), placeholder));
        Ok(self)
    }

    pub fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.param_values
    }

    pub fn to_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn parse_status(kind: StatusKind, raw: &str) -> Result<SqlParam, FilterError> {
    let trimmed = raw.trim();
    match kind {
        StatusKind::Integer => trimmed
            .parse::<i64>()
            .map(SqlParam::from)
            .map_err(|_| FilterError::InvalidStatus(raw.to_string())),
        StatusKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(SqlParam::from(true)),
            "false" | "0" => Ok(SqlParam::from(false)),
            _ => Err(FilterError::InvalidStatus(raw.to_string())),
        },
    }
}

// `%` and `_` in user input match literally
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
