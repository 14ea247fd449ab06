use clap::Parser;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

/// Serve local directories over HTTP under configurable URL prefixes
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file (toml, json, yaml...); defaults apply when it is missing
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config)?;
    logger::init(&cfg.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Mounts are registered before the listener exists and never change afterwards
    let state = Arc::new(config::AppState::new(&cfg));
    let listener = server::create_listener(addr)?;

    logger::log_server_start(
        &addr,
        state.registry.len(),
        state.directory_listing(),
        state.request_logging(),
    );
    if state.registry.is_empty() {
        logger::log_warning("No valid folder mappings configured; every request will 404");
    }

    server::start_server_loop(listener, state, server::signal::wait_for_shutdown()).await;
    Ok(())
}
