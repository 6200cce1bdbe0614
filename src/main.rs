//! Main entry point for the bistro backend.
//!
//! Loads configuration, installs structured logging, connects the document
//! store once, and serves the API until Ctrl-C. The store is closed after the
//! server has drained.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use bistro::{
    AppState, RequestLoggingMiddleware, Settings, get_subscriber, handlers, init_subscriber,
};
use dotenv::dotenv;
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("bistro".to_string(), "info".to_string(), std::io::stdout);
    init_subscriber(subscriber)?;

    let settings = Settings::from_env().context("failed to load settings")?;
    let app_state = AppState::from_settings(&settings)
        .await
        .context("failed to init app_state")?;
    let store = app_state.store.clone();

    tracing::info!(host = %settings.host, port = settings.port, "Starting server");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Cors::permissive())
            .wrap(RequestLoggingMiddleware::new())
            .wrap(TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind((settings.host, settings.port))?
    .run();

    let srv_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            srv_handle.stop(true).await;
        }
        res = server_task => {
            match res {
                Ok(Err(e)) => tracing::error!(error = %e, "Server stopped with error"),
                Err(e) => tracing::error!(error = %e, "Server task failed"),
                Ok(Ok(())) => {}
            }
        }
    }

    store.close().await;
    tracing::info!("Store closed, exiting");
    Ok(())
}
