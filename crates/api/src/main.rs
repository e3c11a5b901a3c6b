//! StudyHall server binary
//!
//! Wires the configuration, the SQLite pool, the repository and the
//! service together by explicit construction, then serves the router.

use std::sync::Arc;

use studyhall_api::{router, AppState};
use studyhall_core::{CourseConverter, StudentConverter, StudentService};
use studyhall_domain::{Result, StudyHallError};
use studyhall_infra::{DbManager, SqliteStudentRepository};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "studyhall server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = studyhall_infra::config::load()?;

    let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
    db.run_migrations()?;

    let repository = Arc::new(SqliteStudentRepository::new(Arc::clone(&db)));
    let service = Arc::new(StudentService::new(repository, StudentConverter, CourseConverter));
    let app = router(AppState { service, db });

    let listener = TcpListener::bind(&config.server.bind_addr).await.map_err(|err| {
        StudyHallError::Config(format!("cannot bind {}: {err}", config.server.bind_addr))
    })?;
    info!(addr = %config.server.bind_addr, "studyhall server listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| StudyHallError::Internal(format!("server error: {err}")))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
