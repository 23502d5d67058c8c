use thiserror::Error;

use crate::{CorrelationId, ReservationId, Version};

/// Errors that can occur when interacting with the reservation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version did not match the version the caller loaded.
    #[error(
        "Concurrency conflict for reservation {reservation_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        reservation_id: ReservationId,
        expected: Version,
        actual: Version,
    },

    /// A record of the same kind already exists for the correlation id.
    #[error("A {kind} reservation already exists for correlation id {correlation_id}")]
    DuplicateCorrelationId {
        kind: String,
        correlation_id: CorrelationId,
    },

    /// The record was not found in the store.
    #[error("Reservation not found: {0}")]
    NotFound(ReservationId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error was caused by a concurrent writer.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict { .. } | StoreError::DuplicateCorrelationId { .. }
        )
    }

    /// Returns true if repeating the same operation may succeed.
    ///
    /// Corrupt payloads and failed migrations fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict { .. }
                | StoreError::DuplicateCorrelationId { .. }
                | StoreError::Database(_)
        )
    }
}

/// Result type for reservation store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use sqlx::migrate::MigrateError;

    use super::*;

    #[test]
    fn test_migration_error_converts() {
        let err: StoreError = MigrateError::VersionMissing(1).into();
        assert!(matches!(err, StoreError::Migration(_)));
        assert!(!err.is_conflict());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_errors() {
        let conflict = StoreError::ConcurrencyConflict {
            reservation_id: ReservationId::new(),
            expected: Version::first(),
            actual: Version::new(2),
        };
        assert!(conflict.is_transient());
        assert!(StoreError::Database(sqlx::Error::PoolTimedOut).is_transient());

        let corrupt: StoreError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(!corrupt.is_transient());
        assert!(!StoreError::NotFound(ReservationId::new()).is_transient());
    }
}
