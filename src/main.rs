use book_catalog::catalog::BookCatalog;
use book_catalog::config::Config;
use book_catalog::database::{SqliteBookStore, establish_pool};
use book_catalog::http::{AppState, HttpServer, HttpServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;

    let pool = establish_pool(config.database_url()).await?;
    let store = SqliteBookStore::new(pool);
    let catalog = BookCatalog::new(store);

    let state = AppState::new(catalog);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
