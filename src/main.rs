//! # Geiger Logger
//!
//! Data logger for a GPS Geiger counter: samples radiation pulse events,
//! combines them with GPS position and time, and appends one
//! checksum-protected `$BGRDD` log line per reporting tick.

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use geiger_logger::config::Config;
use geiger_logger::counter::PulseCounter;
use geiger_logger::detector::DetectorLine;
use geiger_logger::error::GeigerLogError;
use geiger_logger::gps::{GpsReceiverControl, SerialGpsSource};
use geiger_logger::identity::{self, FileProvisioningStore};
use geiger_logger::pipeline;
use geiger_logger::record::formatter::RecordFormatter;
use geiger_logger::record::ModeFlag;
use geiger_logger::writer::FileLogSink;

/// Default configuration path when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the Geiger logger
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first CLI argument or `config/default.toml`)
///    - Set up tracing to stdout, plus a daily-rotated service log when
///      configured
///    - Resolve device identity from the provisioning store; an
///      unprovisioned device refuses to start, since its records would be
///      meaningless
///    - Open the detector and GPS serial lines
///
/// 2. **Main Loop**
///    - One reporting cycle per bucket tick: sample CPM, poll the fix,
///      synthesize the timestamp, format and append the record
///    - A cycle that fails (no GPS lock, write error) is skipped; the next
///      tick retries naturally and no placeholder record is written
///    - Status log line every `status_interval_cycles` cycles
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops the loop and logs totals
///
/// # Errors
///
/// Returns error if configuration is invalid, the device is not
/// provisioned, or a serial line cannot be opened.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    // Keep the non-blocking writer guard alive for the process lifetime
    let _log_guard = init_tracing(&config);

    info!("Geiger logger v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    // Identity resolves exactly once; it is immutable for the process
    let store = FileProvisioningStore::load(&config.device.provision_file)?;
    let identity = identity::resolve(&store)
        .context("device identity missing; refusing to log unprovisioned records")?;
    let mode: ModeFlag = config.device.mode.parse()?;

    let mut counter = PulseCounter::new(config.counter.window_seconds, config.counter.buckets);
    let pulse_handle = counter.handle();

    let detector = DetectorLine::open(&config.detector.port, config.detector.baud_rate)?;
    info!("Detector line open at {}", detector.device_path());
    tokio::spawn(async move {
        if let Err(e) = detector.run(pulse_handle).await {
            warn!("Detector line terminated: {}", e);
        }
    });

    let mut gps = SerialGpsSource::open(&config.gps.port, config.gps.baud_rate)?;
    gps.apply_settings().await?;

    let mut sink = FileLogSink::new(&config.logging.log_dir)?;
    let formatter = RecordFormatter::new(config.logging.truncation);

    let mut tick = interval(counter.bucket_duration());
    info!(
        "Reporting every {}s over a {}s window",
        counter.bucket_duration().as_secs(),
        counter.window_seconds()
    );
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;
    let mut written: u64 = 0;
    let mut skipped: u64 = 0;

    // Main reporting loop
    loop {
        tokio::select! {
            _ = tick.tick() => {
                cycles += 1;

                // Rotating per-day destination, named by the surrounding
                // system rather than the sink
                let destination = format!(
                    "{}-{}.log",
                    identity.device_id,
                    Utc::now().format("%y%m%d")
                );

                match pipeline::run_cycle(
                    &mut counter,
                    &mut gps,
                    &identity,
                    &formatter,
                    mode,
                    &mut sink,
                    &destination,
                ).await {
                    Ok(outcome) => {
                        written += 1;
                        debug!("CPM {} logged to {}", outcome.cpm, destination);
                    }
                    Err(e @ GeigerLogError::InvalidFix(_)) => {
                        skipped += 1;
                        debug!("Cycle skipped, waiting for GPS lock: {}", e);
                    }
                    Err(e) => {
                        skipped += 1;
                        warn!("Cycle failed: {}", e);
                    }
                }

                if cycles % config.logging.status_interval_cycles == 0 {
                    info!(
                        "Status: {} cycles, {} records written, {} skipped",
                        cycles, written, skipped
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total records written: {} ({} cycles skipped)", written, skipped);
                break;
            }
        }
    }

    Ok(())
}

/// Initialize tracing to stdout, with an optional daily-rotated file layer.
///
/// Returns the non-blocking writer guard, which must stay alive for file
/// logging to flush.
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &config.logging.service_log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "geiger-logger.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();

            None
        }
    }
}
