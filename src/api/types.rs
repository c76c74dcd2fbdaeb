//! Shared handler state.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;
use crate::storage::FileStore;

/// State handed to every handler. Connections are opened per request —
/// no connection or transition state is shared between calls, so
/// operations on different records are fully independent.
#[derive(Clone)]
pub struct ApiContext {
    db_path: PathBuf,
    pub uploads: FileStore,
    pub assets: FileStore,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, uploads_root: PathBuf, assets_root: PathBuf) -> Self {
        Self {
            db_path,
            uploads: FileStore::new(uploads_root),
            assets: FileStore::new(assets_root),
        }
    }

    /// Open a database connection for this request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_database(&self.db_path).map_err(ApiError::from)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Context rooted in a fresh temp directory. Keep the guard alive
    /// for the duration of the test.
    pub fn test_context() -> (ApiContext, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(
            dir.path().join("vestry.db"),
            dir.path().join("uploads"),
            dir.path().join("assets"),
        );
        (ctx, dir)
    }
}
