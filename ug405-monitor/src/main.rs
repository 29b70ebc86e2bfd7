//! UG405 Detector Monitor CLI
//!
//! Command-line front end for the ug405-decoder library. It adds:
//! - Configuration layering (TOML file, environment, flags)
//! - The polling loop with detector-count learning and duplicate suppression
//! - Light/full console output
//! - Date-rotated light and full log files

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use ug405_decoder::{ScanMode, ScnResolver, UdpSnmpTransport};

mod config;
mod dual_log;
mod poll;

use config::MonitorConfig;
use dual_log::{DualLogger, FileLogSink, LogHeader};
use poll::{ConsoleStyle, PollLoop, PollSettings};

/// UG405 Monitor - Poll vehicle detector states from a traffic controller
#[derive(Parser, Debug)]
#[command(name = "ug405-monitor")]
#[command(about = "Poll UG405 traffic controller detector states over SNMP", long_about = None)]
#[command(version)]
struct Args {
    /// Controller IPv4 address (overrides IP)
    #[arg(long, value_name = "ADDR")]
    host: Option<String>,

    /// Scan mode: light or full (overrides SCAN_MODE)
    #[arg(short, long, value_name = "MODE")]
    mode: Option<ScanMode>,

    /// Suppress output for frames identical to the previous one
    #[arg(long)]
    skip_duplicates: bool,

    /// Directory for the light/full log files (overrides LOG_DIR)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Delay between poll cycles in milliseconds (0 = continuous)
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Back off up to this many milliseconds while the device does not answer
    #[arg(long, value_name = "MS")]
    backoff_max_ms: Option<u64>,

    /// Deadline for each SNMP request in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// SNMP agent port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Stop after this many poll cycles
    #[arg(long, value_name = "COUNT", conflicts_with = "once")]
    cycles: Option<u64>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Fixed-width console lines (light mode)
    #[arg(long, conflicts_with = "json")]
    compact: bool,

    /// Print each decoded frame as a JSON line
    #[arg(long)]
    json: bool,

    /// Path to configuration file (monitor.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("UG405 Monitor v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", ug405_decoder::VERSION);

    let config = build_config(&args, |key| std::env::var(key).ok())?;
    let host = config.require_host()?.to_string();

    let header = LogHeader {
        scan_mode: config.scan_mode,
        host: host.clone(),
        skip_duplicates: config.skip_duplicates,
    };
    let sink = FileLogSink::new(&config.log_dir, header)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    println!("Logs directory: {}", sink.dir().display());
    println!("Writing light and full logs");

    let transport = UdpSnmpTransport::new(config.resolver.port, config.resolver.request_timeout());
    let resolver = ScnResolver::new(transport, host, config.resolver.clone());
    let settings = poll_settings(&config, &args);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::debug!("Interrupt received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => log::warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    let mut poll = PollLoop::new(resolver, DualLogger::new(sink), std::io::stdout(), settings);
    let end = poll.run(shutdown_rx).await;
    log::debug!(
        "Run ended ({:?}) with {} detectors tracked",
        end,
        poll.state().detector_count
    );

    Ok(())
}

/// Layer defaults, config file, environment and flags
///
/// `lookup` is `std::env::var` in production.
fn build_config<F>(args: &Args, lookup: F) -> Result<MonitorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => MonitorConfig::default(),
    };

    config.apply_env(lookup);
    apply_flags(&mut config, args);

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Flags win over every other source
fn apply_flags(config: &mut MonitorConfig, args: &Args) {
    if let Some(host) = &args.host {
        config.host = Some(host.clone());
    }
    if let Some(mode) = args.mode {
        config.scan_mode = mode;
    }
    if args.skip_duplicates {
        config.skip_duplicates = true;
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(interval) = args.interval_ms {
        config.interval_ms = interval;
    }
    if let Some(backoff) = args.backoff_max_ms {
        config.backoff_max_ms = Some(backoff);
    }
    if let Some(timeout) = args.timeout_ms {
        config.resolver.request_timeout_ms = timeout;
    }
    if let Some(port) = args.port {
        config.resolver.port = port;
    }
}

fn poll_settings(config: &MonitorConfig, args: &Args) -> PollSettings {
    let console_style = if args.json {
        ConsoleStyle::Json
    } else if args.compact {
        ConsoleStyle::Compact
    } else {
        ConsoleStyle::Standard
    };

    PollSettings {
        scan_mode: config.scan_mode,
        skip_duplicates: config.skip_duplicates,
        interval: Duration::from_millis(config.interval_ms),
        backoff_max: config.backoff_max_ms.map(Duration::from_millis),
        max_cycles: if args.once { Some(1) } else { args.cycles },
        console_style,
    }
}

fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    use log::LevelFilter;

    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Diagnostics on stderr, stamped like the console lines; RUST_LOG may refine
/// the level per module
fn init_logging(verbose: u8, quiet: bool) {
    use std::io::Write;

    env_logger::Builder::new()
        .filter_level(log_level(verbose, quiet))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                dual_log::console_timestamp(&chrono::Local::now()),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
