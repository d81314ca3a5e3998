//! Connection-pool plumbing shared by the `PostgreSQL` adapters.
//!
//! Diesel is synchronous; every query runs on the blocking thread pool so
//! the async executor's workers are never parked on I/O.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::messaging::ports::{StoreError, StoreResult};

/// `PostgreSQL` connection pool injected into every adapter.
pub type MessagingPgPool = Pool<ConnectionManager<PgConnection>>;

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(super) async fn run_blocking<F, T>(pool: &MessagingPgPool, f: F) -> StoreResult<T>
where
    F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared
            .get()
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        f(&mut connection)
    })
    .await
    .map_err(StoreError::persistence)?
}

/// Maps Diesel errors, classifying dropped connections as retryable.
pub(super) fn map_diesel_error(err: DieselError) -> StoreError {
    if matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
    ) {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::persistence(err)
    }
}

/// Converts a row limit to the `BIGINT` Diesel expects.
pub(super) fn sql_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
