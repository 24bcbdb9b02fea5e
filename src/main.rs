//! # CGI Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, arranca el servidor y espera a Ctrl-C para
//! apagarlo ordenadamente.

use cgi_server::config::Config;
use cgi_server::logger;
use cgi_server::server::Server;

fn main() {
    logger::init_tracing();

    let config = Config::new();
    config.print_summary();

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "invalid startup configuration");
            std::process::exit(1);
        }
    };

    let handle = match server.start() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    };

    let trigger = handle.shutdown_trigger();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("shutdown requested; finishing queued connections");
        trigger.trigger();
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown disabled");
    }

    let metrics = handle.metrics();
    handle.join();

    tracing::info!(metrics = %metrics.to_json(), "server stopped");
}
