use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vestry";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Vestry/ on all platforms (user-visible, per parish-office requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vestry")
}

/// Get the database directory
pub fn database_dir() -> PathBuf {
    app_data_dir().join("database")
}

/// Get the database file path
pub fn db_path() -> PathBuf {
    database_dir().join("vestry.db")
}

/// Get the uploads directory (supporting documents for requests)
pub fn uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Get the assets directory (parish logo and site assets)
pub fn assets_dir() -> PathBuf {
    app_data_dir().join("assets")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Bind address for the HTTP server (VESTRY_ADDR override)
pub fn bind_addr() -> SocketAddr {
    std::env::var("VESTRY_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Vestry"));
    }

    #[test]
    fn uploads_dir_under_app_data() {
        let uploads = uploads_dir();
        let app = app_data_dir();
        assert!(uploads.starts_with(app));
        assert!(uploads.ends_with("uploads"));
    }

    #[test]
    fn db_path_under_database_dir() {
        let path = db_path();
        assert!(path.starts_with(database_dir()));
        assert!(path.ends_with("vestry.db"));
    }

    #[test]
    fn default_bind_addr_is_loopback() {
        // Only meaningful when VESTRY_ADDR is unset in the test environment
        if std::env::var("VESTRY_ADDR").is_err() {
            assert!(bind_addr().ip().is_loopback());
        }
    }
}
