//! Error types for a ranking run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("invalid inquiry: {0}")]
    InvalidInquiry(String),

    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),

    #[error("data source unavailable: {0}")]
    DataUnavailable(#[source] sqlx::Error),

    #[error("data integrity error: {0}")]
    DataIntegrity(String),
}

impl From<sqlx::Error> for RankError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => RankError::DataIntegrity(err.to_string()),
            other => RankError::DataUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_integrity_errors() {
        let err: RankError = sqlx::Error::ColumnNotFound("booking_status".to_string()).into();
        assert!(matches!(err, RankError::DataIntegrity(_)));
    }

    #[test]
    fn connection_failures_are_unavailable() {
        let err: RankError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RankError::DataUnavailable(_)));
    }
}
