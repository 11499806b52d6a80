use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSort(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}

impl FilterError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidStatus(_) => "status",
            FilterError::InvalidSort(_) => "sort",
            FilterError::InvalidColumn(_) => "column",
        }
    }
}
