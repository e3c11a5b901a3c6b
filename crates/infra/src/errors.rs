//! Mapping of storage-layer errors onto the domain error type

use studyhall_domain::StudyHallError;
use tokio::task::JoinError;

pub(crate) fn map_sql_error(err: rusqlite::Error) -> StudyHallError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => {
            StudyHallError::NotFound("requested row not found".into())
        }
        other => StudyHallError::Database(other.to_string()),
    }
}

pub(crate) fn map_pool_error(err: r2d2::Error) -> StudyHallError {
    StudyHallError::Database(format!("connection pool error: {err}"))
}

pub(crate) fn map_join_error(err: JoinError) -> StudyHallError {
    if err.is_cancelled() {
        StudyHallError::Internal("blocking repository task cancelled".into())
    } else {
        StudyHallError::Internal(format!("blocking repository task failed: {err}"))
    }
}
