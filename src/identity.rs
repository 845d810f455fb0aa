//! # Device Identity Module
//!
//! Resolves the device's persistent identifier and radio network address
//! from non-volatile provisioning storage.
//!
//! Identity is resolved exactly once at startup and carried as an immutable
//! [`DeviceIdentity`] value for the process lifetime. A device that was
//! never provisioned must refuse to log: a record without a device id is
//! meaningless downstream.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{GeigerLogError, Result};

/// Non-volatile provisioning storage, as written at manufacturing time.
pub trait ProvisioningStore {
    /// Provisioned device id, or `None` if the device was never provisioned.
    fn device_id(&self) -> Option<String>;

    /// Provisioned radio address field, or `None` if no radio is configured.
    fn radio_address(&self) -> Option<String>;
}

/// Radio network address, or the documented "no radio" sentinel.
///
/// Logging without a radio is valid, so an absent radio is a normal state
/// distinct from any error. The sentinel renders as `0000` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioAddress {
    /// No radio peripheral configured
    None,
    /// 16-bit radio network address
    Address(u16),
}

impl std::fmt::Display for RadioAddress {
    /// Fixed wire rendering: four uppercase hex digits, `0000` for no radio
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadioAddress::None => write!(f, "0000"),
            RadioAddress::Address(addr) => write!(f, "{:04X}", addr),
        }
    }
}

/// Resolved device identity: read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub radio_address: RadioAddress,
}

/// Resolve the provisioned device id.
///
/// # Errors
///
/// Returns [`GeigerLogError::ConfigurationMissing`] if no identity has ever
/// been provisioned (absent or empty field). The surrounding system must
/// refuse to log in that case.
pub fn resolve_device_id(store: &dyn ProvisioningStore) -> Result<String> {
    match store.device_id() {
        Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => Err(GeigerLogError::ConfigurationMissing(
            "no device id in provisioning store".to_string(),
        )),
    }
}

/// Resolve the radio network address.
///
/// An absent field yields [`RadioAddress::None`], the documented sentinel;
/// logging remains valid without a radio.
///
/// # Errors
///
/// Returns [`GeigerLogError::ConfigurationMissing`] only if a radio field is
/// present but not four hex digits: that is provisioning corruption, not an
/// unconfigured radio.
pub fn resolve_radio_address(store: &dyn ProvisioningStore) -> Result<RadioAddress> {
    match store.radio_address() {
        None => Ok(RadioAddress::None),
        Some(field) => {
            let field = field.trim();
            if field.len() != 4 {
                return Err(GeigerLogError::ConfigurationMissing(format!(
                    "radio address must be 4 hex digits, got {:?}",
                    field
                )));
            }
            let addr = u16::from_str_radix(field, 16).map_err(|_| {
                GeigerLogError::ConfigurationMissing(format!(
                    "radio address is not hexadecimal: {:?}",
                    field
                ))
            })?;
            Ok(RadioAddress::Address(addr))
        }
    }
}

/// Resolve the full device identity at startup.
///
/// # Examples
///
/// ```no_run
/// use geiger_logger::identity::{self, FileProvisioningStore};
///
/// let store = FileProvisioningStore::load("/var/lib/geiger-logger/provision.toml")?;
/// let identity = identity::resolve(&store)?;
/// # Ok::<(), geiger_logger::error::GeigerLogError>(())
/// ```
pub fn resolve(store: &dyn ProvisioningStore) -> Result<DeviceIdentity> {
    let device_id = resolve_device_id(store)?;
    let radio_address = resolve_radio_address(store)?;

    info!(
        "Resolved device identity: id={}, radio={}",
        device_id, radio_address
    );

    Ok(DeviceIdentity {
        device_id,
        radio_address,
    })
}

/// On-disk provisioning image
#[derive(Debug, Deserialize, Default)]
struct ProvisioningImage {
    device_id: Option<String>,
    radio_address: Option<String>,
}

/// File-backed provisioning store (stand-in for the EEPROM image).
#[derive(Debug)]
pub struct FileProvisioningStore {
    image: ProvisioningImage,
}

impl FileProvisioningStore {
    /// Load the provisioning image from a TOML file.
    ///
    /// A missing file means the device was never provisioned: the store
    /// loads empty and identity resolution fails later with
    /// `ConfigurationMissing`, which keeps the failure at the operation
    /// that owns it.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self {
                image: ProvisioningImage::default(),
            });
        }

        let contents = fs::read_to_string(path)?;
        let image: ProvisioningImage = toml::from_str(&contents)?;
        Ok(Self { image })
    }
}

impl ProvisioningStore for FileProvisioningStore {
    fn device_id(&self) -> Option<String> {
        self.image.device_id.clone()
    }

    fn radio_address(&self) -> Option<String> {
        self.image.radio_address.clone()
    }
}
