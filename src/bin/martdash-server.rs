/// MartDash HTTP Server
///
/// Loads the order file named by `MARTDASH_DATA` once and serves dashboard
/// snapshots over HTTP. See `martdash::config` for the environment variables.

use martdash::config::ServerConfig;
use martdash::server::run_server;
use martdash::OrderTable;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let table = OrderTable::from_csv_path(&config.data_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    run_server(&config, table).await
}
