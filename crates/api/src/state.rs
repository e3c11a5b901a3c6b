//! Shared application state for request handlers

use std::sync::Arc;

use studyhall_core::StudentService;
use studyhall_infra::DbManager;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StudentService>,
    pub db: Arc<DbManager>,
}
