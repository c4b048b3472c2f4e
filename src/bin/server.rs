//! postkv Server Binary
//!
//! Starts the TCP server for postkv.

use std::sync::Arc;

use clap::Parser;
use postkv::network::{CommandHandler, Server, ShutdownHandle};
use postkv::{
    BincodeCodec, Codec, CodecKind, Config, JsonCodec, MemoryStore, Paginator, PostKvError,
    PostRepository,
};
use tracing_subscriber::{fmt, EnvFilter};

/// postkv Server
#[derive(Parser, Debug)]
#[command(name = "postkv-server")]
#[command(about = "In-memory blog post store with cursor pagination")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Payload codec
    #[arg(short, long, value_enum, default_value_t = CodecKind::Json)]
    codec: CodecKind,

    /// Page size when a request gives none
    #[arg(long, default_value = "20")]
    default_limit: usize,

    /// Largest page a request can get
    #[arg(long, default_value = "100")]
    max_limit: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,postkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("postkv Server v{}", postkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .codec(args.codec)
        .default_page_limit(args.default_limit)
        .max_page_limit(args.max_limit)
        .build();

    let result = match config.codec {
        CodecKind::Json => serve(config, JsonCodec),
        CodecKind::Bincode => serve(config, BincodeCodec),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Build the store, hand it to the server, and discard it once serving ends
fn serve<C: Codec + 'static>(config: Config, codec: C) -> postkv::Result<()> {
    tracing::info!("Payload codec: {}", codec.name());

    let store = Arc::new(MemoryStore::new());
    let repository = Arc::new(PostRepository::new(
        store,
        codec,
        Paginator::new(config.page_limits),
    ));

    let handler: Arc<dyn CommandHandler> = repository.clone();
    let server = Server::bind(config, handler)?;
    install_signal_handler(server.shutdown_handle())?;
    server.run()?;

    repository.close()
}

/// Stop the server on Ctrl+C or SIGTERM
fn install_signal_handler(shutdown: ShutdownHandle) -> postkv::Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown.shutdown();
    })
    .map_err(|e| PostKvError::Config(format!("failed to install signal handler: {}", e)))
}
