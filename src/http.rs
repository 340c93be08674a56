use crate::catalog::BookCatalog;
use crate::repositories::BookStore;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod handler;

#[derive(Debug)]
pub struct AppState<S: BookStore> {
    catalog: Arc<BookCatalog<S>>,
}

impl<S: BookStore> AppState<S> {
    pub fn new(catalog: BookCatalog<S>) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &BookCatalog<S> {
        &self.catalog
    }
}

impl<S: BookStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<S: BookStore>(
        state: AppState<S>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = api_routes()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

fn api_routes<S: BookStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/books",
            get(handler::list_books::<S>).post(handler::add_book::<S>),
        )
        .route(
            "/books/{isbn}",
            get(handler::find_book::<S>)
                .delete(handler::delete_book::<S>)
                .put(handler::update_book::<S>),
        )
}
