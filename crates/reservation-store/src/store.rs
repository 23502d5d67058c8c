use async_trait::async_trait;

use crate::{CorrelationId, ReservationId, Result, StoredRecord, Version};

/// Options for saving a record to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Version the caller loaded. `Version::initial()` means the record must not exist yet.
    pub expected_version: Version,
}

impl SaveOptions {
    /// Creates options expecting the record to not exist (new aggregate).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Version::initial(),
        }
    }

    /// Creates options expecting the record to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: version,
        }
    }

    /// Returns true if the save must create the record.
    pub fn is_insert(&self) -> bool {
        self.expected_version == Version::initial()
    }
}

/// Core trait for reservation store implementations.
///
/// Each save is atomic and scoped to a single record. There is no
/// transaction spanning several records.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Saves a record.
    ///
    /// Inserts fail with `DuplicateCorrelationId` if a record of the same kind
    /// already exists for the correlation id. Updates fail with
    /// `ConcurrencyConflict` if the stored version is not
    /// `options.expected_version`.
    ///
    /// Returns the stored record carrying its new version.
    async fn save(&self, record: StoredRecord, options: SaveOptions) -> Result<StoredRecord>;

    /// Finds a record by reservation id.
    async fn find_by_id(&self, kind: &str, id: ReservationId) -> Result<Option<StoredRecord>>;

    /// Finds the record of a kind belonging to a correlation id.
    async fn find_by_correlation_id(
        &self,
        kind: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Option<StoredRecord>>;

    /// Returns true if a record of the kind exists for the correlation id.
    async fn exists_by_correlation_id(
        &self,
        kind: &str,
        correlation_id: &CorrelationId,
    ) -> Result<bool> {
        Ok(self
            .find_by_correlation_id(kind, correlation_id)
            .await?
            .is_some())
    }

    /// Deletes a record. Returns false if nothing was deleted.
    async fn delete(&self, kind: &str, id: ReservationId) -> Result<bool>;
}
