//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{StoredDomainRecord, StoredEvent};
use crate::config::RegistryConfig;
use crate::domain::{DomainName, DomainRecord, RegistryEvent};
use crate::error::RegistryError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
    event_log_enabled: bool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool, event_log_enabled: bool) -> Self {
        Self {
            pool,
            event_log_enabled,
        }
    }

    /// Opens a connection pool from configuration and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RegistryError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool, config.event_log_enabled))
    }

    /// Returns `true` if events are appended to the event log.
    #[must_use]
    pub const fn event_log_enabled(&self) -> bool {
        self.event_log_enabled
    }

    /// Durably applies one committed event: appends it to the event log
    /// (when enabled) and updates the matching `domain_records` row, in a
    /// single transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError::PersistenceError`] on database failure.
    pub async fn apply_event(&self, event: &RegistryEvent) -> Result<(), RegistryError> {
        let sequence = to_i64(event.sequence())?;
        let mut tx = self.pool.begin().await?;

        if self.event_log_enabled {
            let payload = serde_json::to_value(event)
                .map_err(|e| RegistryError::Internal(e.to_string()))?;
            sqlx::query(
                "INSERT INTO registry_events (sequence, domain, event_type, payload) \
                 VALUES ($1, $2, $3, $4) ON CONFLICT (sequence) DO NOTHING",
            )
            .bind(sequence)
            .bind(event.name().as_str())
            .bind(event.event_type_str())
            .bind(payload)
            .execute(&mut *tx)
            .await?;
        }

        match event {
            RegistryEvent::DomainRegistered {
                name,
                controller,
                deposit,
                timestamp,
                ..
            } => {
                sqlx::query(
                    "INSERT INTO domain_records \
                     (name, controller, deposit, registered_seq, registered_at, last_sequence, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $4, now()) \
                     ON CONFLICT (name) DO UPDATE SET \
                       controller = EXCLUDED.controller, deposit = EXCLUDED.deposit, \
                       registered_seq = EXCLUDED.registered_seq, \
                       registered_at = EXCLUDED.registered_at, \
                       last_sequence = EXCLUDED.last_sequence, updated_at = now() \
                     WHERE domain_records.last_sequence < EXCLUDED.last_sequence",
                )
                .bind(name.as_str())
                .bind(controller.as_str())
                .bind(deposit.to_string())
                .bind(sequence)
                .bind(*timestamp)
                .execute(&mut *tx)
                .await?;
            }
            RegistryEvent::DomainReleased { name, .. } => {
                sqlx::query(
                    "UPDATE domain_records SET controller = NULL, deposit = '0', \
                     registered_seq = 0, registered_at = NULL, last_sequence = $2, updated_at = now() \
                     WHERE name = $1 AND last_sequence < $2",
                )
                .bind(name.as_str())
                .bind(sequence)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Overwrites `domain_records` with a full in-memory snapshot.
    ///
    /// Used after the writer fell behind the event bus and at shutdown.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError::PersistenceError`] on database failure.
    pub async fn flush_snapshot(
        &self,
        records: &[DomainRecord],
        last_sequence: u64,
    ) -> Result<u64, RegistryError> {
        let last_sequence = to_i64(last_sequence)?;
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for record in records {
            let result = sqlx::query(
                "INSERT INTO domain_records \
                 (name, controller, deposit, registered_seq, registered_at, last_sequence, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, now()) \
                 ON CONFLICT (name) DO UPDATE SET \
                   controller = EXCLUDED.controller, deposit = EXCLUDED.deposit, \
                   registered_seq = EXCLUDED.registered_seq, \
                   registered_at = EXCLUDED.registered_at, \
                   last_sequence = GREATEST(domain_records.last_sequence, EXCLUDED.last_sequence), \
                   updated_at = now()",
            )
            .bind(record.name.as_str())
            .bind(record.controller.as_ref().map(|c| c.as_str()))
            .bind(record.deposit.to_string())
            .bind(to_i64(record.registered_seq)?)
            .bind(record.registered_at)
            .bind(last_sequence)
            .execute(&mut *tx)
            .await?;
            written = written.saturating_add(result.rows_affected());
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Loads every stored record plus the highest sequence seen, for
    /// [`crate::domain::DomainStore::restore`].
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError::PersistenceError`] on database failure or
    /// if a row cannot be converted back into a [`DomainRecord`].
    pub async fn load_state(&self) -> Result<(Vec<DomainRecord>, u64), RegistryError> {
        let rows = sqlx::query_as::<_, StoredDomainRecord>(
            "SELECT name, controller, deposit, registered_seq, registered_at, last_sequence \
             FROM domain_records ORDER BY registered_seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut last_sequence = 0u64;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            last_sequence = last_sequence.max(u64::try_from(row.last_sequence).unwrap_or(0));
            records.push(DomainRecord::try_from(row)?);
        }

        let logged: Option<i64> = sqlx::query_scalar("SELECT MAX(sequence) FROM registry_events")
            .fetch_one(&self.pool)
            .await?;
        if let Some(logged) = logged {
            last_sequence = last_sequence.max(u64::try_from(logged).unwrap_or(0));
        }

        Ok((records, last_sequence))
    }

    /// Loads logged events for one domain with a sequence above `after`,
    /// oldest first, at most `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError::PersistenceError`] on database failure.
    pub async fn load_events_after(
        &self,
        domain: &DomainName,
        after: u64,
        limit: u32,
    ) -> Result<Vec<StoredEvent>, RegistryError> {
        let rows = sqlx::query_as::<_, StoredEvent>(
            "SELECT id, sequence, domain, event_type, payload, created_at FROM registry_events \
             WHERE domain = $1 AND sequence > $2 ORDER BY sequence ASC LIMIT $3",
        )
        .bind(domain.as_str())
        .bind(to_i64(after)?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

fn to_i64(value: u64) -> Result<i64, RegistryError> {
    i64::try_from(value)
        .map_err(|_| RegistryError::Internal(format!("sequence {value} exceeds BIGINT range")))
}
