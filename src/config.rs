//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::record::truncate::TruncationPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub device: DeviceConfig,
    pub counter: CounterConfig,
    pub gps: GpsConfig,
    pub detector: DetectorConfig,
    pub logging: LoggingConfig,
}

/// Device identity and operating mode
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_provision_file")]
    pub provision_file: String,

    /// Mode flag stamped into every record: "normal" or "test"
    #[serde(default = "default_mode")]
    pub mode: String,
}

/// CPM window geometry
#[derive(Debug, Deserialize, Clone)]
pub struct CounterConfig {
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u32,

    #[serde(default = "default_buckets")]
    pub buckets: usize,
}

/// GPS receiver line
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_gps_port")]
    pub port: String,

    #[serde(default = "default_gps_baud_rate")]
    pub baud_rate: u32,
}

/// Detector board line
#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    #[serde(default = "default_detector_port")]
    pub port: String,

    #[serde(default = "default_detector_baud_rate")]
    pub baud_rate: u32,
}

/// Record logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub truncation: TruncationPolicy,

    /// Cycles between status log lines
    #[serde(default = "default_status_interval_cycles")]
    pub status_interval_cycles: u64,

    /// Directory for the service's own daily-rotated diagnostic log;
    /// omit to log to stdout only
    #[serde(default)]
    pub service_log_dir: Option<String>,
}

// Default value functions
fn default_provision_file() -> String { "/var/lib/geiger-logger/provision.toml".to_string() }
fn default_mode() -> String { "normal".to_string() }

fn default_window_seconds() -> u32 { 60 }
fn default_buckets() -> usize { 12 }

fn default_gps_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_gps_baud_rate() -> u32 { 9600 }

fn default_detector_port() -> String { "/dev/ttyACM0".to_string() }
fn default_detector_baud_rate() -> u32 { 115200 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_status_interval_cycles() -> u64 { 12 }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.device.provision_file.is_empty() {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("provision_file cannot be empty")
            ));
        }

        if self.device.mode.parse::<crate::record::ModeFlag>().is_err() {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("mode must be \"normal\" or \"test\"")
            ));
        }

        // Window geometry: CPM must scale to an exact integer, and the tick
        // period must divide the window evenly
        if self.counter.window_seconds == 0 || 60 % self.counter.window_seconds != 0 {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("window_seconds must be a divisor of 60")
            ));
        }

        if self.counter.buckets == 0
            || self.counter.window_seconds as usize % self.counter.buckets != 0 {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("buckets must be a non-zero divisor of window_seconds")
            ));
        }

        if self.gps.port.is_empty() {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("gps port cannot be empty")
            ));
        }

        if self.detector.port.is_empty() {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("detector port cannot be empty")
            ));
        }

        for (name, baud) in [
            ("gps baud_rate", self.gps.baud_rate),
            ("detector baud_rate", self.detector.baud_rate),
        ] {
            if ![4800, 9600, 19200, 38400, 57600, 115200].contains(&baud) {
                return Err(crate::error::GeigerLogError::Config(
                    toml::de::Error::custom(format!(
                        "{} must be one of: 4800, 9600, 19200, 38400, 57600, 115200", name
                    ))
                ));
            }
        }

        if self.logging.log_dir.is_empty() {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("log_dir cannot be empty")
            ));
        }

        if self.logging.status_interval_cycles == 0 {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("status_interval_cycles must be greater than 0")
            ));
        }

        if matches!(&self.logging.service_log_dir, Some(dir) if dir.is_empty()) {
            return Err(crate::error::GeigerLogError::Config(
                toml::de::Error::custom("service_log_dir cannot be empty when set")
            ));
        }

        Ok(())
    }
}
