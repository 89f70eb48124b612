//! ChromoDB Server Binary
//!
//! Starts the TCP/TLS server, or the local shell with `--shell`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chromodb::config::{RunMode, SyncStrategy};
use chromodb::monitor::ProcessMemoryMonitor;
use chromodb::network::Server;
use chromodb::{shell, Config, Dispatcher, Engine, TransactionGate};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// ChromoDB Server
#[derive(Parser, Debug)]
#[command(name = "chromodb-server")]
#[command(about = "Disk-resident key-value store")]
#[command(version)]
struct Args {
    /// Use the local shell instead of the network listener
    #[arg(long)]
    shell: bool,

    /// Upgrade clients to TLS (requires --cert and --key)
    #[arg(long)]
    tls: bool,

    /// Memory limit in bytes; exceeding it stops the process
    #[arg(long, default_value_t = 750 * 1024 * 1024)]
    memory_limit: u64,

    /// Username remote clients authenticate with
    #[arg(long, default_value = "")]
    user: String,

    /// Password remote clients authenticate with
    #[arg(long, default_value = "")]
    pass: String,

    /// TLS private key (PEM)
    #[arg(long, default_value = "")]
    key: String,

    /// TLS certificate chain (PEM)
    #[arg(long, default_value = "")]
    cert: String,

    /// TCP/TLS listener port
    #[arg(long, default_value_t = 7676)]
    port: u16,

    /// Data log file
    #[arg(long, default_value = "chromo.db")]
    data_file: String,

    /// Index file
    #[arg(long, default_value = "chromo.idx")]
    index_file: String,

    /// Maximum concurrent connections
    #[arg(long, default_value_t = 1024)]
    max_connections: usize,

    /// fsync both files after every write instead of every 100
    #[arg(long)]
    sync_every_write: bool,
}

fn main() {
    // Initialize tracing/logging (stderr, so the shell owns stdout)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chromodb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> chromodb::Result<()> {
    let mode = if args.shell {
        RunMode::Shell
    } else {
        RunMode::Network
    };

    let config = build_config(&args);
    config.validate(mode)?;

    tracing::info!("ChromoDB v{}", chromodb::VERSION);

    let memory = Arc::new(ProcessMemoryMonitor::new(config.memory_limit)?);
    memory.spawn(Duration::from_millis(config.memory_poll_interval_ms))?;

    let engine = Engine::from_config(&config)?;
    let gate = Arc::new(TransactionGate::new(engine));
    let dispatcher = Dispatcher::new(Arc::clone(&gate), &config, memory);

    let result = match mode {
        RunMode::Shell => {
            let stdin = io::stdin();
            shell::run(&dispatcher, stdin.lock(), io::stdout())
        }
        RunMode::Network => serve(&config, dispatcher),
    };

    // Every connection has finished by now; close the files last.
    let closed = gate.start_transaction().close();
    result.and(closed)
}

fn serve(config: &Config, dispatcher: Dispatcher) -> chromodb::Result<()> {
    let server = Server::bind(config, dispatcher)?;

    let (signal_tx, signal_rx) = crossbeam::channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = signal_tx.try_send(());
    })
    .map_err(|e| chromodb::ChromoError::Config(format!("cannot install signal handler: {}", e)))?;

    let handle = server.shutdown_handle();
    std::thread::spawn(move || {
        if signal_rx.recv().is_ok() {
            tracing::info!("Received shutdown signal");
            handle.shutdown();
        }
    });

    server.run()
}

fn build_config(args: &Args) -> Config {
    let mut builder = Config::builder()
        .data_path(&args.data_file)
        .index_path(&args.index_file)
        .listen_addr(format!("0.0.0.0:{}", args.port))
        .max_connections(args.max_connections)
        .memory_limit(args.memory_limit)
        .credentials(&args.user, &args.pass);

    if args.sync_every_write {
        builder = builder.sync_strategy(SyncStrategy::EveryWrite);
    }

    if args.tls {
        builder = builder.tls(&args.cert, &args.key);
    }

    builder.build()
}
