use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    CorrelationId, ReservationId, Result, StoreError, StoredRecord,
    store::{ReservationStore, SaveOptions},
};

/// Records and the `(kind, correlation_id)` index, guarded together.
#[derive(Default)]
struct Inner {
    records: HashMap<ReservationId, StoredRecord>,
    by_correlation: HashMap<(String, CorrelationId), ReservationId>,
}

/// In-memory reservation store implementation for testing.
///
/// Provides the same guarantees as the PostgreSQL implementation: the
/// write lock makes the version check and the write a single step.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Returns the number of records of one kind.
    pub async fn count_kind(&self, kind: &str) -> usize {
        self.inner
            .read()
            .await
            .by_correlation
            .keys()
            .filter(|(k, _)| k == kind)
            .count()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn save(&self, mut record: StoredRecord, options: SaveOptions) -> Result<StoredRecord> {
        let mut inner = self.inner.write().await;
        let reservation_id = record.reservation_id;

        if options.is_insert() {
            if let Some(existing) = inner.records.get(&reservation_id) {
                tracing::debug!(%reservation_id, "Insert of an existing reservation rejected");
                return Err(StoreError::ConcurrencyConflict {
                    reservation_id,
                    expected: options.expected_version,
                    actual: existing.version,
                });
            }

            let key = (record.kind.clone(), record.correlation_id.clone());
            if inner.by_correlation.contains_key(&key) {
                tracing::debug!(
                    kind = %record.kind,
                    correlation_id = %record.correlation_id,
                    "Duplicate correlation id rejected"
                );
                return Err(StoreError::DuplicateCorrelationId {
                    kind: record.kind,
                    correlation_id: record.correlation_id,
                });
            }
            inner.by_correlation.insert(key, reservation_id);
        } else {
            let current = inner
                .records
                .get(&reservation_id)
                .filter(|r| r.kind == record.kind)
                .map(|r| r.version)
                .ok_or(StoreError::NotFound(reservation_id))?;

            if current != options.expected_version {
                tracing::debug!(
                    %reservation_id,
                    expected = %options.expected_version,
                    actual = %current,
                    "Stale version rejected"
                );
                return Err(StoreError::ConcurrencyConflict {
                    reservation_id,
                    expected: options.expected_version,
                    actual: current,
                });
            }
        }

        record.version = options.expected_version.next();
        record.updated_at = Utc::now();
        inner.records.insert(reservation_id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, kind: &str, id: ReservationId) -> Result<Option<StoredRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id).filter(|r| r.kind == kind).cloned())
    }

    async fn find_by_correlation_id(
        &self,
        kind: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Option<StoredRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_correlation
            .get(&(kind.to_string(), correlation_id.clone()))
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn delete(&self, kind: &str, id: ReservationId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(correlation_id) = inner
            .records
            .get(&id)
            .filter(|r| r.kind == kind)
            .map(|r| r.correlation_id.clone())
        else {
            return Ok(false);
        };

        inner.records.remove(&id);
        inner.by_correlation.remove(&(kind.to_string(), correlation_id));
        Ok(true)
    }
}
