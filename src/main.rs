#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::PublicUrl;
use crate::config::Config;
use crate::mirror::Mirror;
use crate::mirror::Twitter;
use crate::storage::Backend;
use crate::storage::Storage;

mod api;
mod config;
mod graceful_shutdown;
mod index;
mod mirror;
mod notes;
mod sanitize;
mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "anonotes=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let address = config.address;

    let app = setup_app(config).await?;

    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection or migrations
/// - HTTP client for the mirror
pub async fn setup_app(config: Config) -> Result<Router> {
    let mirror = Twitter::new(config.twitter)?;
    let public_url = PublicUrl(config.public_url);

    let router = match storage::setup(config.database).await? {
        Backend::Postgres(storage) => create_router(storage, mirror, public_url),
        Backend::Memory(storage) => create_router(storage, mirror, public_url),
    };

    Ok(router)
}

/// Create the router for the notes service
fn create_router<S: Storage, M: Mirror>(storage: S, mirror: M, public_url: PublicUrl) -> Router {
    Router::new()
        .route("/", get(index::index::<S, M>))
        .merge(api::router::<S, M>())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(storage))
                .layer(Extension(mirror))
                .layer(Extension(public_url)),
        )
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
