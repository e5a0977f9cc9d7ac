//! SQLite-backed [`SampleStore`].
//!
//! One `samples` table with a unique index on `source_url`; sections are
//! stored as a JSON object so their order survives the round trip.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use super::{new_id, SampleStore};
use crate::error::{Error, Result};
use crate::record::{SampleFilter, SampleRecord, Sections, StoredSample};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS samples (
    id               TEXT PRIMARY KEY,
    source_url       TEXT NOT NULL UNIQUE,
    title            TEXT NOT NULL,
    subject          TEXT NOT NULL,
    description      TEXT NOT NULL,
    sections_json    TEXT NOT NULL DEFAULT '{}',
    word_count       INTEGER NOT NULL DEFAULT 0,
    read_time        TEXT NOT NULL DEFAULT '',
    file_link        TEXT NOT NULL DEFAULT '',
    publication_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_samples_subject ON samples(subject);
"#;

const COLUMNS: &str = "id, source_url, title, subject, description, sections_json, \
                       word_count, read_time, file_link, publication_date";

/// SQLite implementation of [`SampleStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the parent directory cannot be created and
    /// [`Error::Persistence`] if the database cannot be opened.
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if SQLite cannot be initialised.
    pub async fn in_memory() -> Result<Self> {
        // Each pooled connection would get its own memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, applying the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the schema cannot be created.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_sample(row: &SqliteRow) -> Result<StoredSample> {
    let sections_json: String = row.try_get("sections_json")?;
    let sections: Sections = serde_json::from_str(&sections_json)?;

    let word_count: i64 = row.try_get("word_count")?;
    let word_count = u64::try_from(word_count)
        .map_err(|_| Error::Persistence(format!("word_count out of range: {word_count}")))?;

    let published: String = row.try_get("publication_date")?;
    let publication_date = DateTime::parse_from_rfc3339(&published)
        .map_err(|e| Error::Persistence(format!("bad publication_date {published:?}: {e}")))?
        .with_timezone(&Utc);

    Ok(StoredSample {
        id: row.try_get("id")?,
        record: SampleRecord {
            title: row.try_get("title")?,
            subject: row.try_get("subject")?,
            description: row.try_get("description")?,
            sections,
            word_count,
            read_time: row.try_get("read_time")?,
            file_link: row.try_get("file_link")?,
            publication_date,
            source_url: row.try_get("source_url")?,
        },
    })
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl SampleStore for SqliteStore {
    async fn upsert(&self, record: &SampleRecord) -> Result<String> {
        let sections_json = serde_json::to_string(&record.sections)?;

        let row = sqlx::query(
            r#"
            INSERT INTO samples (id, source_url, title, subject, description, sections_json,
                                 word_count, read_time, file_link, publication_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_url) DO UPDATE SET
                title = excluded.title,
                subject = excluded.subject,
                description = excluded.description,
                sections_json = excluded.sections_json,
                word_count = excluded.word_count,
                read_time = excluded.read_time,
                file_link = excluded.file_link,
                publication_date = excluded.publication_date
            RETURNING id
            "#,
        )
        .bind(new_id())
        .bind(&record.source_url)
        .bind(&record.title)
        .bind(&record.subject)
        .bind(&record.description)
        .bind(&sections_json)
        .bind(i64::try_from(record.word_count).map_err(|_| {
            Error::Persistence(format!("word_count out of range: {}", record.word_count))
        })?)
        .bind(&record.read_time)
        .bind(&record.file_link)
        .bind(record.publication_date.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: String = row.try_get("id")?;
        debug!(id = %id, url = %record.source_url, "upserted sample");
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredSample>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM samples WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_sample).transpose()
    }

    async fn list(&self, filter: &SampleFilter, limit: usize) -> Result<Vec<StoredSample>> {
        let rows = match &filter.subject {
            Some(subject) => {
                sqlx::query(&format!(
                    "SELECT {COLUMNS} FROM samples WHERE subject = ? ORDER BY rowid LIMIT ?"
                ))
                .bind(subject)
                .bind(limit_param(limit))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM samples ORDER BY rowid LIMIT ?"))
                    .bind(limit_param(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_sample).collect()
    }

    async fn count(&self, filter: &SampleFilter) -> Result<u64> {
        let n: i64 = match &filter.subject {
            Some(subject) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM samples WHERE subject = ?")
                    .bind(subject)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM samples")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(u64::try_from(n).unwrap_or_default())
    }
}
