#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    data::student::PgStudentStore,
    error::{BindSnafu, RosterResult, ServeSnafu},
    routes::router,
    state::RosterState,
};
use snafu::ResultExt;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod state;
mod validation;

async fn shutdown_signal(state: RosterState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

async fn run() -> RosterResult<()> {
    let config = RuntimeConfiguration::new()?;
    let db_config = config.db_config();

    let options = PgPoolOptions::new().max_connections(db_config.max_connections());
    let store = PgStudentStore::new(options, &db_config).await?;
    info!("Connected to database and applied migrations");

    let state = RosterState::new(Arc::new(store));
    let app = router(state.clone());

    let address = config.server_config().address();
    let listener = TcpListener::bind(&address)
        .await
        .context(BindSnafu { address: &address })?;

    info!(?address, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .context(ServeSnafu)
}

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv_result {
        warn!(?e, "No .env file loaded, using the process environment only");
    }

    if let Err(e) = run().await {
        error!(?e, "Fatal error");
        std::process::exit(1);
    }
}
