//! xr-serial - MaxLinear/Exar USB UART bridge control driver
//!
//! This crate drives the configuration plane of the Exar USB-to-serial
//! bridge family (XR2280X, XR21B1411, XR21V141X, XR21B142X): baud rate,
//! character format, flow control, modem control lines and break
//! signalling. The four chips expose the same logical registers behind
//! four incompatible address maps and request codes, and two of them take
//! character format through the standard CDC class protocol instead of a
//! vendor register; the model table in [`model`] hides all of that behind
//! one interface.
//!
//! The bulk data path (the actual byte stream) is out of scope and belongs
//! to the enclosing serial framework, represented here only by the
//! [`DataStream`] start/stop pair. Register traffic goes through the
//! [`ControlTransport`] trait; [`device`] provides the nusb-backed
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use nusb::MaybeFuture;
//! use xr_serial::{attach, LineConfig, ModemPins};
//! # struct Stream;
//! # impl xr_serial::DataStream for Stream {
//! #     fn start(&mut self) -> xr_serial::Result<()> { Ok(()) }
//! #     fn stop(&mut self) {}
//! # }
//!
//! let info = nusb::list_devices().wait()?
//!     .find(|d| d.vendor_id() == 0x04e2)
//!     .expect("no Exar device connected");
//!
//! // interface 1 is the first data interface, endpoint 1 its bulk pair
//! let mut port = attach(&info, 1, 1)?;
//! let mut stream = Stream;
//!
//! let effective = port.open(&mut stream, Some(&LineConfig {
//!     baud: 115200,
//!     ..LineConfig::default()
//! }))?;
//! println!("running at {} baud", effective.baud);
//!
//! port.set_modem_lines(ModemPins::DTR | ModemPins::RTS, ModemPins::empty())?;
//! port.close(&mut stream)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod baud;
mod device;
mod error;
mod flow;
mod model;
mod modem;
mod port;
mod protocol;
mod termios;
mod transport;

pub use baud::{baud_setting, BaudSetting};
pub use device::{attach, list_devices, XrDeviceInfo, XrUsbTransport};
pub use error::{Error, Result};
pub use model::{LogicalReg, Model, RegisterAddr};
pub use port::{DataStream, XrPort};
pub use protocol::{LineCoding, ModemPins};
pub use termios::{CharSize, LineConfig, Parity, StopBits};
pub use transport::ControlTransport;
