//! Error types for xr-serial operations

use thiserror::Error;

use crate::model::{LogicalReg, Model};

/// Errors that can occur when driving an Exar USB UART bridge
#[derive(Debug, Error)]
pub enum Error {
    /// No matching device was found
    #[error("Exar device not found (VID:04e2)")]
    DeviceNotFound,

    /// Failed to open the USB device
    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    /// Failed to claim the control interface
    #[error("Failed to claim control interface {interface}: {message}")]
    ClaimFailed { interface: u8, message: String },

    /// A control transfer failed
    #[error("Control transfer failed: {0}")]
    TransferFailed(String),

    /// A register read returned the wrong number of bytes
    #[error("Register read returned {0} bytes, expected 1")]
    ShortRead(usize),

    /// The logical register does not exist on this model
    ///
    /// Register lookups are made from a closed set of call sites, so hitting
    /// this at runtime is a programming error rather than a device fault.
    #[error("Register {reg:?} is not available on {model:?}")]
    UnsupportedRegister { model: Model, reg: LogicalReg },

    /// The product id does not belong to a supported bridge chip
    #[error("Unsupported device {vendor_id:04x}:{product_id:04x}")]
    UnsupportedDevice { vendor_id: u16, product_id: u16 },

    /// Asked to bind a control interface; only odd-numbered interfaces
    /// carry the data endpoints
    #[error("Interface {0} is a control interface, not a data interface")]
    NotADataInterface(u8),

    /// The generic data stream failed to start
    #[error("Data stream failed to start: {0}")]
    StreamFailed(String),
}

/// Result type for xr-serial operations
pub type Result<T> = std::result::Result<T, Error>;
