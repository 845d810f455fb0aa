//! # Geiger Logger Library
//!
//! Data logger for a GPS Geiger counter.
//!
//! This library provides the core measurement-and-log-record pipeline:
//! pulse-rate accumulation into counts-per-minute, GPS timestamp synthesis,
//! device-identity tagging, and serialization of one checksum-protected
//! `$BGRDD` log line per reporting tick.

pub mod config;
pub mod counter;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod gps;
pub mod identity;
pub mod pipeline;
pub mod record;
pub mod writer;
