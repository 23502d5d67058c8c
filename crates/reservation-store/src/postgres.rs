use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CorrelationId, ReservationId, Result, StoreError, StoredRecord, Version,
    store::{ReservationStore, SaveOptions},
};

const UNIQUE_KIND_CORRELATION: &str = "unique_kind_correlation";
const PRIMARY_KEY: &str = "reservations_pkey";

/// PostgreSQL-backed reservation store implementation.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL reservation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<StoredRecord> {
        let correlation_id: String = row.try_get("correlation_id")?;
        let correlation_id = CorrelationId::parse(&correlation_id).map_err(|e| {
            StoreError::Serialization(serde_json::Error::io(std::io::Error::other(e)))
        })?;

        Ok(StoredRecord {
            reservation_id: ReservationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            kind: row.try_get("kind")?,
            correlation_id,
            state: row.try_get("state")?,
            version: Version::new(row.try_get("version")?),
            payload: row.try_get("payload")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert(&self, mut record: StoredRecord) -> Result<StoredRecord> {
        record.version = Version::first();
        record.updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO reservations (id, kind, correlation_id, state, version, payload, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.reservation_id.as_uuid())
        .bind(&record.kind)
        .bind(record.correlation_id.as_str())
        .bind(&record.state)
        .bind(record.version.as_i64())
        .bind(&record.payload)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some(UNIQUE_KIND_CORRELATION) => {
                        return StoreError::DuplicateCorrelationId {
                            kind: record.kind.clone(),
                            correlation_id: record.correlation_id.clone(),
                        };
                    }
                    Some(PRIMARY_KEY) => {
                        return StoreError::ConcurrencyConflict {
                            reservation_id: record.reservation_id,
                            expected: Version::initial(),
                            actual: Version::first(),
                        };
                    }
                    _ => {}
                }
            }
            StoreError::Database(e)
        })?;

        Ok(record)
    }

    async fn update(&self, mut record: StoredRecord, expected: Version) -> Result<StoredRecord> {
        let reservation_id = record.reservation_id;
        let mut tx = self.pool.begin().await?;

        // Row lock keeps the version check and the write in one unit
        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM reservations WHERE id = $1 AND kind = $2 FOR UPDATE",
        )
        .bind(reservation_id.as_uuid())
        .bind(&record.kind)
        .fetch_optional(&mut *tx)
        .await?;

        let actual = Version::new(current.ok_or(StoreError::NotFound(reservation_id))?);
        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                reservation_id,
                expected,
                actual,
            });
        }

        record.version = expected.next();
        record.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE reservations
            SET state = $3, version = $4, payload = $5, updated_at = $6
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(reservation_id.as_uuid())
        .bind(&record.kind)
        .bind(&record.state)
        .bind(record.version.as_i64())
        .bind(&record.payload)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn save(&self, record: StoredRecord, options: SaveOptions) -> Result<StoredRecord> {
        let kind = record.kind.clone();
        let result = if options.is_insert() {
            self.insert(record).await
        } else {
            self.update(record, options.expected_version).await
        };

        if let Err(ref e) = result
            && e.is_conflict()
        {
            tracing::debug!(kind = %kind, error = %e, "Write rejected by a concurrent writer");
            metrics::counter!("reservation_store_conflicts_total", "kind" => kind).increment(1);
        }

        result
    }

    async fn find_by_id(&self, kind: &str, id: ReservationId) -> Result<Option<StoredRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, correlation_id, state, version, payload, updated_at
            FROM reservations
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find_by_correlation_id(
        &self,
        kind: &str,
        correlation_id: &CorrelationId,
    ) -> Result<Option<StoredRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, correlation_id, state, version, payload, updated_at
            FROM reservations
            WHERE kind = $1 AND correlation_id = $2
            "#,
        )
        .bind(kind)
        .bind(correlation_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn exists_by_correlation_id(
        &self,
        kind: &str,
        correlation_id: &CorrelationId,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE kind = $1 AND correlation_id = $2)",
        )
        .bind(kind)
        .bind(correlation_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete(&self, kind: &str, id: ReservationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND kind = $2")
            .bind(id.as_uuid())
            .bind(kind)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
