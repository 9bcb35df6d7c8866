use thiserror::Error;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write (e.g. duplicate email)
    #[error("Duplicate value violates {constraint}")]
    Duplicate { constraint: String },

    /// A foreign key rejected the write or delete (e.g. section still referenced)
    #[error("Foreign key violation on {constraint}")]
    ForeignKey { constraint: String },

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DatabaseError::Duplicate { .. })
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, DatabaseError::ForeignKey { .. })
    }

    /// Classify a driver error by its SQLSTATE code
    fn classify(code: Option<&str>, constraint: Option<&str>) -> Option<Self> {
        let constraint = constraint.unwrap_or("unknown").to_string();
        match code {
            Some(UNIQUE_VIOLATION) => Some(DatabaseError::Duplicate { constraint }),
            Some(FOREIGN_KEY_VIOLATION) => Some(DatabaseError::ForeignKey { constraint }),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let code = db_err.code();
            if let Some(classified) = Self::classify(code.as_deref(), db_err.constraint()) {
                return classified;
            }
        }
        DatabaseError::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unique_violation() {
        let err = DatabaseError::classify(Some("23505"), Some("users_email_key")).unwrap();
        assert!(err.is_duplicate());
        assert_eq!(err.to_string(), "Duplicate value violates users_email_key");
    }

    #[test]
    fn classifies_foreign_key_violation() {
        let err = DatabaseError::classify(Some("23503"), None).unwrap();
        assert!(err.is_foreign_key());
    }

    #[test]
    fn other_codes_are_not_classified() {
        assert!(DatabaseError::classify(Some("42P01"), None).is_none());
        assert!(DatabaseError::classify(None, None).is_none());
    }

    #[test]
    fn row_not_found_stays_sqlx() {
        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
