use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Database connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Persistence error: {0}")]
    Other(String),
}

impl PersistError {
    pub fn kind(&self) -> &'static str {
        match self {
            PersistError::ConnectionUnavailable(_) => "connection_unavailable",
            PersistError::ConstraintViolation(_) => "constraint_violation",
            PersistError::Other(_) => "other",
        }
    }
}

impl From<sqlx::Error> for PersistError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() =>
            {
                PersistError::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => PersistError::ConnectionUnavailable(error.to_string()),
            _ => PersistError::Other(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_unavailable() {
        let err = PersistError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, PersistError::ConnectionUnavailable(_)));
        assert_eq!(err.kind(), "connection_unavailable");

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(PersistError::from(sqlx::Error::Io(io)), PersistError::ConnectionUnavailable(_)));
    }

    #[test]
    fn test_row_not_found_is_other() {
        let err = PersistError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, PersistError::Other(_)));
    }
}
