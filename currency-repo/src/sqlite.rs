//! SQLite adapter for the rate cache and the preference store.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use currency_types::freshness::parse_timestamp;
use currency_types::ports::keys;
use currency_types::{Currency, CurrencyCode, PreferenceStore, RateCache, RateError, RateResult};

use crate::types::DbCurrency;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// One SQLite database backing both the rate cache and the preferences.
pub struct SqliteRepo {
    pool: SqlitePool,
    source_code: watch::Sender<CurrencyCode>,
    target_code: watch::Sender<CurrencyCode>,
    /// Keeps the durable write and the notification of a code in the same order.
    code_writes: Mutex<()>,
}

impl SqliteRepo {
    /// Opens (or creates) the database and applies the schema.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // In-memory databases live only as long as a connection does.
        let pool = SqlitePoolOptions::new()
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        create_schema(&pool).await?;

        let source = load_code(&pool, keys::SOURCE_CODE, CurrencyCode::DEFAULT_SOURCE).await?;
        let target = load_code(&pool, keys::TARGET_CODE, CurrencyCode::DEFAULT_TARGET).await?;
        debug!(%source, %target, "Loaded currency selection");

        Ok(Self {
            pool,
            source_code: watch::Sender::new(source),
            target_code: watch::Sender::new(target),
            code_writes: Mutex::new(()),
        })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn write_value(&self, key: &str, value: &str) -> RateResult<()> {
        sqlx::query(
            r#"INSERT INTO preferences (key, value) VALUES (?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value"#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| RateError::StorageWrite(e.to_string()))?;

        Ok(())
    }

    async fn save_code(
        &self,
        key: &str,
        sender: &watch::Sender<CurrencyCode>,
        code: CurrencyCode,
    ) -> RateResult<()> {
        let _guard = self.code_writes.lock().await;
        self.write_value(key, code.code()).await?;
        sender.send_replace(code);
        debug!(key, %code, "Saved currency code");
        Ok(())
    }
}

async fn create_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    let ddl = include_str!("../migrations/0001_create_tables.sql");
    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}

async fn read_value(pool: &SqlitePool, key: &str) -> RateResult<Option<String>> {
    sqlx::query_scalar(r#"SELECT value FROM preferences WHERE key = ?"#)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| RateError::StorageRead(e.to_string()))
}

/// Reads a stored code, falling back to `default` when absent or unrecognised.
async fn load_code(pool: &SqlitePool, key: &str, default: CurrencyCode) -> RateResult<CurrencyCode> {
    let Some(stored) = read_value(pool, key).await? else {
        return Ok(default);
    };

    Ok(stored.parse().unwrap_or_else(|e| {
        warn!(key, error = %e, %default, "Ignoring unrecognised stored currency code");
        default
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate cache
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateCache for SqliteRepo {
    async fn read_currency_data(&self) -> RateResult<Vec<Currency>> {
        let rows: Vec<DbCurrency> =
            sqlx::query_as(r#"SELECT code, name, rate FROM currencies ORDER BY code"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RateError::StorageRead(e.to_string()))?;

        Ok(rows.into_iter().map(DbCurrency::into_domain).collect())
    }

    async fn insert_currency_data(&self, currency: &Currency) -> RateResult<()> {
        sqlx::query(
            r#"INSERT INTO currencies (code, name, rate) VALUES (?, ?, ?)
               ON CONFLICT(code) DO UPDATE SET
                   name = excluded.name,
                   rate = excluded.rate"#,
        )
        .bind(&currency.code)
        .bind(&currency.name)
        .bind(currency.rate)
        .execute(&self.pool)
        .await
        .map_err(|e| RateError::StorageWrite(e.to_string()))?;

        Ok(())
    }

    async fn clean_up(&self) -> RateResult<()> {
        let result = sqlx::query(r#"DELETE FROM currencies"#)
            .execute(&self.pool)
            .await
            .map_err(|e| RateError::StorageWrite(e.to_string()))?;

        debug!(removed = result.rows_affected(), "Cleared rate cache");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preference store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PreferenceStore for SqliteRepo {
    async fn save_last_updated(&self, timestamp: &str) -> RateResult<()> {
        let millis = parse_timestamp(timestamp)?;
        self.write_value(keys::LAST_UPDATED, &millis.to_string())
            .await
    }

    async fn last_updated(&self) -> RateResult<Option<i64>> {
        read_value(&self.pool, keys::LAST_UPDATED)
            .await?
            .map(|raw| {
                raw.parse::<i64>().map_err(|e| {
                    RateError::StorageRead(format!("corrupt {} value {raw:?}: {e}", keys::LAST_UPDATED))
                })
            })
            .transpose()
    }

    async fn save_source_currency_code(&self, code: CurrencyCode) -> RateResult<()> {
        self.save_code(keys::SOURCE_CODE, &self.source_code, code)
            .await
    }

    async fn save_target_currency_code(&self, code: CurrencyCode) -> RateResult<()> {
        self.save_code(keys::TARGET_CODE, &self.target_code, code)
            .await
    }

    fn read_source_currency_code(&self) -> watch::Receiver<CurrencyCode> {
        self.source_code.subscribe()
    }

    fn read_target_currency_code(&self) -> watch::Receiver<CurrencyCode> {
        self.target_code.subscribe()
    }
}
