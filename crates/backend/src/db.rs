// =============================================================================
// CSR Backend - Database Layer
// =============================================================================
// Four append-only reading tables (quality, reactor, flow, syngas) plus the
// batch/task pair. Rows are only ever inserted; nothing updates or deletes.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::time::Duration;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

// -----------------------------------------------------------------------------
// Row Models
// -----------------------------------------------------------------------------

/// Fuel quality metrics of the produced CSR.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CsrQualityRow {
    pub id: i64,
    pub pci: f64,
    pub pcs: f64,
    pub humidity: f64,
    pub granulometry: f64,
    pub cendres: f64,
    pub carbone: f64,
    pub densite: f64,
    pub created_at: DateTime<Utc>,
}

/// Gasification reactor temperature (°C).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReactorRow {
    pub id: i64,
    pub temperature: f64,
    pub created_at: DateTime<Utc>,
}

/// Feed flow rate (t/h).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FlowRow {
    pub id: i64,
    pub debit: f64,
    pub created_at: DateTime<Utc>,
}

/// Syngas composition (volume %) and tar content.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyngasRow {
    pub id: i64,
    pub h2: f64,
    pub co: f64,
    pub ch4: f64,
    pub co2: f64,
    pub tars: f64,
    pub created_at: DateTime<Utc>,
}

/// Production batch. Seeded only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BatchRow {
    pub id: i64,
    pub reference: String,
    pub tonnage: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Operator task attached to a batch. Seeded only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub batch_id: Option<i64>,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Values of a quality reading, without id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewQuality {
    pub pci: f64,
    pub pcs: f64,
    pub humidity: f64,
    pub granulometry: f64,
    pub cendres: f64,
    pub carbone: f64,
    pub densite: f64,
}

/// Values of a syngas reading, without id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSyngas {
    pub h2: f64,
    pub co: f64,
    pub ch4: f64,
    pub co2: f64,
    pub tars: f64,
}

// -----------------------------------------------------------------------------
// Tables & Seeding
// -----------------------------------------------------------------------------

/// Every table owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    CsrQuality,
    Reactor,
    Flow,
    Syngas,
    Batches,
    Tasks,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::CsrQuality,
        Table::Reactor,
        Table::Flow,
        Table::Syngas,
        Table::Batches,
        Table::Tasks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::CsrQuality => "csr_quality",
            Table::Reactor => "reactor_readings",
            Table::Flow => "flow_readings",
            Table::Syngas => "syngas_readings",
            Table::Batches => "batches",
            Table::Tasks => "tasks",
        }
    }
}

/// Result of seeding one table.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    Inserted(usize),
    /// Table already had rows.
    Skipped,
    Failed(String),
}

/// Per-table outcome of [`Database::seed_demo_data`].
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    entries: Vec<(Table, SeedOutcome)>,
}

impl SeedReport {
    pub fn outcome(&self, table: Table) -> Option<&SeedOutcome> {
        self.entries
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, outcome)| outcome)
    }

    pub fn inserted_total(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, outcome)| match outcome {
                SeedOutcome::Inserted(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SeedOutcome::Failed(_)))
            .count()
    }
}

pub const SEED_QUALITY: NewQuality = NewQuality {
    pci: 18.5,
    pcs: 20.3,
    humidity: 12.4,
    granulometry: 25.0,
    cendres: 11.2,
    carbone: 48.6,
    densite: 0.35,
};

pub const SEED_REACTOR_TEMPERATURE: f64 = 870.0;

pub const SEED_FLOW_DEBIT: f64 = 1.2;

pub const SEED_SYNGAS: NewSyngas = NewSyngas {
    h2: 41.0,
    co: 32.0,
    ch4: 8.0,
    co2: 14.0,
    tars: 0.6,
};

const SEED_BATCHES: [(&str, f64, &str); 3] = [
    ("CSR-2024-001", 24.5, "delivered"),
    ("CSR-2024-002", 18.0, "in_production"),
    ("CSR-2024-003", 21.7, "planned"),
];

const SEED_TASKS: [(&str, &str, &str); 4] = [
    ("CSR-2024-001", "Archive laboratory PCI certificate", "done"),
    ("CSR-2024-002", "Chlorine sampling on line 2", "in_progress"),
    ("CSR-2024-002", "Replace NIR sensor window", "todo"),
    ("CSR-2024-003", "Schedule shredder maintenance", "todo"),
];

impl Database {
    /// Create a new database connection pool.
    pub async fn new(url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = url.contains(":memory:");

        // Add create_if_missing option for SQLite files
        let url_with_options = if in_memory {
            url.to_string()
        } else if url.starts_with("sqlite:") && !url.contains('?') {
            format!("{}?mode=rwc", url)
        } else if url.starts_with("sqlite:") && !url.contains("mode=") {
            format!("{}&mode=rwc", url)
        } else {
            url.to_string()
        };

        // An in-memory database lives as long as its connection does.
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options.connect(&url_with_options).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS csr_quality (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pci REAL NOT NULL,
                pcs REAL NOT NULL,
                humidity REAL NOT NULL,
                granulometry REAL NOT NULL,
                cendres REAL NOT NULL,
                carbone REAL NOT NULL,
                densite REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reactor_readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                temperature REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS flow_readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                debit REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS syngas_readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                h2 REAL NOT NULL,
                co REAL NOT NULL,
                ch4 REAL NOT NULL,
                co2 REAL NOT NULL,
                tars REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS batches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reference TEXT NOT NULL UNIQUE,
                tonnage REAL NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                batch_id INTEGER REFERENCES batches(id),
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let _ = sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_batch ON tasks(batch_id)")
            .execute(&self.pool)
            .await;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Insert the demonstration rows into every table that is still empty.
    ///
    /// Best-effort: a failing table is logged and the remaining tables are
    /// still seeded.
    pub async fn seed_demo_data(&self) -> SeedReport {
        let mut report = SeedReport::default();

        for table in Table::ALL {
            let outcome = match self.seed_table(table).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Failed to seed {}: {}", table.as_str(), e);
                    SeedOutcome::Failed(e.to_string())
                }
            };
            if let SeedOutcome::Inserted(n) = outcome {
                tracing::info!("Seeded {} row(s) into {}", n, table.as_str());
            }
            report.entries.push((table, outcome));
        }

        report
    }

    async fn seed_table(&self, table: Table) -> Result<SeedOutcome, sqlx::Error> {
        if self.count_rows(table).await? > 0 {
            return Ok(SeedOutcome::Skipped);
        }

        let inserted = match table {
            Table::CsrQuality => {
                self.insert_quality(&SEED_QUALITY).await?;
                1
            }
            Table::Reactor => {
                self.insert_reactor(SEED_REACTOR_TEMPERATURE).await?;
                1
            }
            Table::Flow => {
                self.insert_flow(SEED_FLOW_DEBIT).await?;
                1
            }
            Table::Syngas => {
                self.insert_syngas(&SEED_SYNGAS).await?;
                1
            }
            Table::Batches => {
                for (reference, tonnage, status) in SEED_BATCHES {
                    sqlx::query("INSERT INTO batches (reference, tonnage, status) VALUES (?, ?, ?)")
                        .bind(reference)
                        .bind(tonnage)
                        .bind(status)
                        .execute(&self.pool)
                        .await?;
                }
                SEED_BATCHES.len()
            }
            Table::Tasks => {
                // batch_id stays NULL when the batch seed did not land
                for (reference, title, status) in SEED_TASKS {
                    sqlx::query(
                        r#"
                        INSERT INTO tasks (batch_id, title, status)
                        VALUES ((SELECT id FROM batches WHERE reference = ?), ?, ?)
                        "#,
                    )
                    .bind(reference)
                    .bind(title)
                    .bind(status)
                    .execute(&self.pool)
                    .await?;
                }
                SEED_TASKS.len()
            }
        };

        Ok(SeedOutcome::Inserted(inserted))
    }

    /// Number of rows currently stored in `table`.
    pub async fn count_rows(&self, table: Table) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
    }

    // =========================================================================
    // Inserts
    // =========================================================================

    pub async fn insert_quality(&self, q: &NewQuality) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO csr_quality (pci, pcs, humidity, granulometry, cendres, carbone, densite)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(q.pci)
        .bind(q.pcs)
        .bind(q.humidity)
        .bind(q.granulometry)
        .bind(q.cendres)
        .bind(q.carbone)
        .bind(q.densite)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_reactor(&self, temperature: f64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO reactor_readings (temperature) VALUES (?)")
            .bind(temperature)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_flow(&self, debit: f64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO flow_readings (debit) VALUES (?)")
            .bind(debit)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_syngas(&self, s: &NewSyngas) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO syngas_readings (h2, co, ch4, co2, tars)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(s.h2)
        .bind(s.co)
        .bind(s.ch4)
        .bind(s.co2)
        .bind(s.tars)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Latest Readings
    // =========================================================================

    pub async fn latest_quality(&self) -> Result<Option<CsrQualityRow>, sqlx::Error> {
        sqlx::query_as::<_, CsrQualityRow>("SELECT * FROM csr_quality ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn latest_reactor(&self) -> Result<Option<ReactorRow>, sqlx::Error> {
        sqlx::query_as::<_, ReactorRow>("SELECT * FROM reactor_readings ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn latest_flow(&self) -> Result<Option<FlowRow>, sqlx::Error> {
        sqlx::query_as::<_, FlowRow>("SELECT * FROM flow_readings ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn latest_syngas(&self) -> Result<Option<SyngasRow>, sqlx::Error> {
        sqlx::query_as::<_, SyngasRow>("SELECT * FROM syngas_readings ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    /// Seeded batches, oldest first.
    pub async fn batches(&self) -> Result<Vec<BatchRow>, sqlx::Error> {
        sqlx::query_as::<_, BatchRow>("SELECT * FROM batches ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// Tasks attached to one batch.
    pub async fn tasks_for_batch(&self, batch_id: i64) -> Result<Vec<TaskRow>, sqlx::Error> {
        sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE batch_id = ? ORDER BY id")
            .bind(batch_id)
            .fetch_all(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_empty_tables_have_no_latest_row() {
        let db = memory_db().await;

        assert!(db.latest_quality().await.unwrap().is_none());
        assert!(db.latest_reactor().await.unwrap().is_none());
        assert!(db.latest_flow().await.unwrap().is_none());
        assert!(db.latest_syngas().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_fills_every_table_once() {
        let db = memory_db().await;

        let first = db.seed_demo_data().await;
        assert_eq!(first.failures(), 0);
        assert_eq!(first.outcome(Table::Reactor), Some(&SeedOutcome::Inserted(1)));
        assert_eq!(first.outcome(Table::Batches), Some(&SeedOutcome::Inserted(3)));
        assert_eq!(first.outcome(Table::Tasks), Some(&SeedOutcome::Inserted(4)));

        let second = db.seed_demo_data().await;
        assert_eq!(second.inserted_total(), 0);
        for table in Table::ALL {
            assert_eq!(second.outcome(table), Some(&SeedOutcome::Skipped));
        }

        assert_eq!(db.count_rows(Table::CsrQuality).await.unwrap(), 1);
        assert_eq!(db.count_rows(Table::Tasks).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_seed_skips_only_populated_tables() {
        let db = memory_db().await;
        db.insert_reactor(910.0).await.unwrap();

        let report = db.seed_demo_data().await;
        assert_eq!(report.outcome(Table::Reactor), Some(&SeedOutcome::Skipped));
        assert_eq!(report.outcome(Table::Flow), Some(&SeedOutcome::Inserted(1)));

        let reactor = db.latest_reactor().await.unwrap().unwrap();
        assert_eq!(reactor.temperature, 910.0);
    }

    #[tokio::test]
    async fn test_seed_continues_after_failing_table() {
        let db = memory_db().await;
        sqlx::query("DROP TABLE flow_readings")
            .execute(db.pool())
            .await
            .unwrap();

        let report = db.seed_demo_data().await;
        assert!(matches!(report.outcome(Table::Flow), Some(SeedOutcome::Failed(_))));
        assert_eq!(report.failures(), 1);
        assert_eq!(report.outcome(Table::Syngas), Some(&SeedOutcome::Inserted(1)));
        assert!(db.latest_syngas().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_latest_row_is_highest_id() {
        let db = memory_db().await;
        db.insert_flow(1.2).await.unwrap();
        db.insert_flow(1.6).await.unwrap();

        let latest = db.latest_flow().await.unwrap().unwrap();
        assert_eq!(latest.debit, 1.6);
        assert_eq!(latest.id, 2);
    }

    #[tokio::test]
    async fn test_seeded_tasks_link_to_batches() {
        let db = memory_db().await;
        db.seed_demo_data().await;

        let batches = db.batches().await.unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].reference, "CSR-2024-002");

        let tasks = db.tasks_for_batch(batches[1].id).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.batch_id == Some(batches[1].id)));
    }
}
