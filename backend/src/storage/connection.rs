use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqliteConnection, SqlitePool, Transaction,
};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::error;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// DbConnection manages the SQLite pool and serializes writers.
///
/// Reads go straight to the pool. Every write goes through
/// [`DbConnection::begin_write`], which holds a process-wide gate for the
/// lifetime of the transaction, so check-then-insert sequences (capacity,
/// duplicate enrolment, publish-once) cannot interleave.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
    write_gate: Arc<Mutex<()>>,
}

/// A database transaction that owns the write gate until it is finished.
pub struct WriteTransaction {
    // Dropped before the guard, so an abandoned transaction is rolled back
    // before the next writer gets in.
    tx: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTransaction {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Roll back after a failed operation. A rollback error is only logged,
    /// the caller reports the error that caused it.
    pub async fn abandon(self) {
        if let Err(e) = self.rollback().await {
            error!("Failed to roll back transaction: {}", e);
        }
    }
}

impl DbConnection {
    /// Connect to a database URL such as `sqlite:eventdesk.db`
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?;
        Self::with_options(options, max_connections).await
    }

    /// Open (creating if needed) a database file
    pub async fn open_file(path: &Path, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path);
        Self::with_options(options, max_connections).await
    }

    async fn with_options(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for the write gate, then open a transaction
    pub async fn begin_write(&self) -> Result<WriteTransaction> {
        let guard = self.write_gate.clone().lock_owned().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTransaction { tx, _guard: guard })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                duration INTEGER,
                participants_per_invite TEXT NOT NULL,
                capacity_per_occurrence INTEGER NOT NULL CHECK (capacity_per_occurrence >= 0),
                published_at INTEGER,
                image TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_events_created_at
            ON events(created_at DESC);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS event_translations (
                event_id TEXT NOT NULL,
                language_code TEXT NOT NULL,
                name TEXT NOT NULL,
                short_description TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (event_id, language_code),
                FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS venues (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS venue_translations (
                venue_id TEXT NOT NULL,
                language_code TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                accessibility_info TEXT NOT NULL DEFAULT '',
                additional_info TEXT NOT NULL DEFAULT '',
                arrival_instructions TEXT NOT NULL DEFAULT '',
                www_url TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (venue_id, language_code),
                FOREIGN KEY (venue_id) REFERENCES venues (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS occurrences (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL,
                venue_id TEXT NOT NULL,
                time INTEGER NOT NULL,
                occurrence_language TEXT NOT NULL DEFAULT 'fi',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE,
                FOREIGN KEY (venue_id) REFERENCES venues (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_occurrences_time
            ON occurrences(time);
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_occurrences_event_id
            ON occurrences(event_id);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS guardians (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                language TEXT NOT NULL DEFAULT 'fi',
                created_at INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS children (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS child_guardians (
                child_id TEXT NOT NULL,
                guardian_id TEXT NOT NULL,
                PRIMARY KEY (child_id, guardian_id),
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE,
                FOREIGN KEY (guardian_id) REFERENCES guardians (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS enrolments (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                occurrence_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (child_id, occurrence_id),
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE,
                FOREIGN KEY (occurrence_id) REFERENCES occurrences (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_enrolments_occurrence_id
            ON enrolments(occurrence_id);
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }
}
