use super::error::FilterError;
use super::types::{quote_identifier, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// `?sort=` only chooses a direction; the column is always `id`.
    pub fn parse(sort: &str) -> Result<FilterOrderInfo, FilterError> {
        let sort = match sort.trim().to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(FilterError::InvalidSort(sort.to_string())),
        };
        Ok(FilterOrderInfo { column: "id", sort })
    }

    pub fn generate(info: &FilterOrderInfo) -> String {
        format!("ORDER BY {} {}", quote_identifier(info.column), info.sort.to_sql())
    }
}
