use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::engine::ExpirySweeper;
use crate::services::NotifyService;

/// Shared server state
///
/// Holds the configuration, the embedded database handle, and the
/// long-lived services. Cloning is shallow; everything heavyweight sits
/// behind an `Arc` or is itself a cheap handle.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT validation service
    pub jwt_service: Arc<JwtService>,
    /// Outbound notification dispatcher
    pub notify: NotifyService,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// Creates the work directory, opens the database at
    /// `work_dir/database/engine.db`, and wires up the services.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db_dir = PathBuf::from(&config.work_dir).join("database");
        std::fs::create_dir_all(&db_dir)?;
        let db_path = db_dir.join("engine.db");

        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        Ok(Self::with_db(config.clone(), db_service.db))
    }

    /// State backed by an in-memory database, used by tests
    pub async fn initialize_in_memory(config: &Config) -> Result<Self> {
        let db_service = DbService::new_in_memory()
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        Ok(Self::with_db(config.clone(), db_service.db))
    }

    fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notify = NotifyService::from_config(&config);
        Self {
            config,
            db,
            jwt_service,
            notify,
        }
    }

    /// Start background tasks, returning the registry that owns them
    ///
    /// Must be called once before `Server::run()`. Currently registers the
    /// periodic expiry sweeper.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let sweeper = ExpirySweeper::new(
            self.db.clone(),
            self.notify.clone(),
            self.config.expiry_warning_days,
            self.config.sweep_interval_secs,
        );
        let token = tasks.shutdown_token();
        tasks.spawn("expiry-sweeper", TaskKind::Periodic, async move {
            sweeper.run(token).await;
        });
        tasks
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
