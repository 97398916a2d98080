use storage::{ConnectionCache, SqliteConnector};

/// Built once in `main` and shared by every handler through the router.
pub(crate) struct AppState {
    pub(crate) db: ConnectionCache<SqliteConnector>,
}

impl AppState {
    pub(crate) fn new(database_url: Option<String>) -> Self {
        Self {
            db: ConnectionCache::new(SqliteConnector, database_url),
        }
    }
}
