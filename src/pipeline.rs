//! # Reporting Pipeline
//!
//! Drives one reporting cycle through its stages:
//!
//! ```text
//! Idle → Sampling → Synthesizing → Formatting → Writing → Idle
//! ```
//!
//! Terminal failure at Synthesizing (invalid fix) aborts the cycle back to
//! Idle without invoking the downstream stages; no partial record is ever
//! formatted or written. A failed cycle is simply absent from the log, and
//! the next tick retries naturally.
//!
//! Only the counter's bucket swap touches shared state; formatting and
//! writing run with the pulse handle fully live, so no pulse is dropped
//! during I/O.

use tracing::{debug, trace};

use crate::counter::PulseCounter;
use crate::error::Result;
use crate::gps::{timestamp, GpsSource};
use crate::identity::DeviceIdentity;
use crate::record::formatter::RecordFormatter;
use crate::record::{LogRecord, ModeFlag};
use crate::writer::LogSink;

/// Result of one completed reporting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// CPM sampled this cycle
    pub cpm: u32,
    /// Bytes handed to the sink
    pub bytes_written: usize,
}

/// Run one reporting cycle.
///
/// # Arguments
///
/// * `counter` - Rolling pulse window; sampled and rotated once
/// * `gps` - Fix source, polled once
/// * `identity` - Process-lifetime device identity
/// * `formatter` - Configured record formatter
/// * `mode` - Mode flag stamped into the record
/// * `sink` - Record destination
/// * `destination` - Destination name, owned by the caller
///
/// # Errors
///
/// * [`crate::error::GeigerLogError::InvalidFix`] - fix untrustworthy; cycle
///   aborted before formatting
/// * [`crate::error::GeigerLogError::WriteFailed`] - sink rejected the
///   record; not retried here
/// * [`crate::error::GeigerLogError::Gps`] - fix could not be obtained
pub async fn run_cycle<G, S>(
    counter: &mut PulseCounter,
    gps: &mut G,
    identity: &DeviceIdentity,
    formatter: &RecordFormatter,
    mode: ModeFlag,
    sink: &mut S,
    destination: &str,
) -> Result<CycleOutcome>
where
    G: GpsSource,
    S: LogSink,
{
    trace!("Cycle: Sampling");
    let cpm = counter.sample();

    trace!("Cycle: Synthesizing");
    let fix = gps.poll_fix().await?;
    let ts = timestamp::synthesize(&fix)?;

    trace!("Cycle: Formatting");
    let record = LogRecord {
        timestamp: ts,
        fix,
        cpm,
        identity,
        mode,
    };
    let line = formatter.format(&record);

    trace!("Cycle: Writing");
    sink.write(destination, &line).await?;

    debug!("Cycle complete: CPM {} -> {}", cpm, destination);
    Ok(CycleOutcome {
        cpm,
        bytes_written: line.len(),
    })
}
