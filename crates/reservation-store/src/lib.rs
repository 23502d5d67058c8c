//! Persistence port for saga participant aggregates.
//!
//! Aggregates are stored as versioned JSON records keyed by resource kind.
//! A store guarantees at most one record per `(kind, correlation_id)` and
//! rejects writes whose expected version is stale.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CorrelationId, ReservationId};
pub use error::{Result, StoreError};
pub use memory::InMemoryReservationStore;
pub use postgres::PostgresReservationStore;
pub use record::{StoredRecord, Version};
pub use store::{ReservationStore, SaveOptions};
