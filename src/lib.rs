pub mod admin;
pub mod api;
pub mod booking;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod requests;
pub mod storage;
pub mod validation;

use tracing_subscriber::EnvFilter;

/// Start the parish portal: tracing, data directories, account
/// bootstrap, then the HTTP API until ctrl-c.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Vestry starting v{}", config::APP_VERSION);

    std::fs::create_dir_all(config::database_dir())?;
    std::fs::create_dir_all(config::uploads_dir())?;
    std::fs::create_dir_all(config::assets_dir())?;

    // Run migrations and make sure an administrator account exists
    let conn = db::open_database(&config::db_path())?;
    admin::ensure_admin_account(&conn)?;
    drop(conn);

    let ctx = api::ApiContext::new(
        config::db_path(),
        config::uploads_dir(),
        config::assets_dir(),
    );
    let mut server = api::start_api_server(ctx, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "Vestry API listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    server.shutdown();

    Ok(())
}
