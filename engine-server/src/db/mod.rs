//! Database Module
//!
//! Embedded SurrealDB storage with schema and unique-index definitions.

pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// Unique constraints are the authoritative guard for coupon and access
/// code uniqueness; application-level checks only produce friendlier errors.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS subscription SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS coupon SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS coupon_usage SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS access_code SCHEMALESS;

    DEFINE INDEX IF NOT EXISTS coupon_code_unique ON TABLE coupon COLUMNS code UNIQUE;
    DEFINE INDEX IF NOT EXISTS access_code_unique ON TABLE access_code COLUMNS code UNIQUE;
"#;

/// Owns the embedded SurrealDB handle and applies the schema on startup
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// In-memory database, used by tests
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("engine")
            .use_db("shop")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        tracing::info!("Database connection established (SurrealDB embedded)");
        Ok(Self { db })
    }
}
