//! Typed persistence of aggregates over a reservation store.

use std::marker::PhantomData;

use common::{CorrelationId, ReservationId};
use reservation_store::{ReservationStore, SaveOptions, StoredRecord};

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Loads and saves one aggregate type through a [`ReservationStore`].
///
/// The repository owns the version bookkeeping: an aggregate's version is
/// used as the expected version on save and refreshed from the stored record
/// after every load and save.
pub struct Repository<S, A>
where
    S: ReservationStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> Clone for Repository<S, A>
where
    S: ReservationStore + Clone,
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<S, A> Repository<S, A>
where
    S: ReservationStore,
    A: Aggregate,
{
    /// Creates a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Saves the aggregate, inserting it if it was never saved.
    ///
    /// On success the aggregate carries its new version.
    pub async fn save(&self, aggregate: &mut A) -> Result<(), DomainError> {
        let options = SaveOptions::expect_version(aggregate.version());
        let record = StoredRecord::from_payload(
            aggregate.id(),
            A::kind(),
            aggregate.correlation_id().clone(),
            aggregate.state_name(),
            aggregate.version(),
            aggregate,
        )?;

        let stored = self.store.save(record, options).await?;
        aggregate.set_version(stored.version);

        tracing::debug!(
            kind = A::kind(),
            correlation_id = %aggregate.correlation_id(),
            state = aggregate.state_name(),
            version = %stored.version,
            "Aggregate saved"
        );
        Ok(())
    }

    /// Loads an aggregate by id.
    pub async fn find_by_id(&self, id: ReservationId) -> Result<Option<A>, DomainError> {
        self.store
            .find_by_id(A::kind(), id)
            .await?
            .map(Self::from_record)
            .transpose()
    }

    /// Loads the aggregate belonging to a correlation id.
    pub async fn find_by_correlation_id(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<A>, DomainError> {
        self.store
            .find_by_correlation_id(A::kind(), correlation_id)
            .await?
            .map(Self::from_record)
            .transpose()
    }

    /// Loads the aggregate belonging to a correlation id, failing if absent.
    pub async fn load_existing(&self, correlation_id: &CorrelationId) -> Result<A, DomainError> {
        self.find_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| DomainError::AggregateNotFound {
                kind: A::kind(),
                correlation_id: correlation_id.to_string(),
            })
    }

    /// Returns true if an aggregate exists for the correlation id.
    pub async fn exists_by_correlation_id(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .store
            .exists_by_correlation_id(A::kind(), correlation_id)
            .await?)
    }

    /// Deletes an aggregate. Returns false if it was not stored.
    pub async fn delete(&self, id: ReservationId) -> Result<bool, DomainError> {
        Ok(self.store.delete(A::kind(), id).await?)
    }

    fn from_record(record: StoredRecord) -> Result<A, DomainError> {
        let mut aggregate: A = record.payload_as()?;
        aggregate.set_version(record.version);
        Ok(aggregate)
    }
}
