use clap::Parser;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve the current directory over HTTP
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Listen address, e.g. `:8080` or `0.0.0.0:9000` [default: :8080]
    addr: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = config::Config::load()?;

    // Multi-threaded runtime; worker count from config or CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(args, cfg))
}

async fn async_main(args: Args, cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("HTTP-Server v{VERSION}");

    let listen = args.addr.unwrap_or_else(|| cfg.server.listen.clone());
    let addr = config::parse_listen_addr(&listen)?;
    let root = std::env::current_dir()?;

    let writer = logger::writer::LogWriter::new(
        cfg.logging.access_log_file.as_deref(),
        cfg.logging.error_log_file.as_deref(),
    )?;
    let state = Arc::new(config::AppState::new(root, Arc::new(writer), &cfg));

    println!("Serving {} on {listen}", state.root.display());

    let listener = server::create_listener(addr)?;
    server::run(listener, state).await;
    Ok(())
}
