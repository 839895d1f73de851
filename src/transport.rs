//! Control-transfer transport abstraction
//!
//! Every register access is one blocking request/response exchange on the
//! device's shared control channel. The trait keeps the register translation
//! layer independent of the USB stack; [`crate::device`] provides the nusb
//! backed implementation and the tests use a recording fake.

use crate::error::Result;

/// A synchronous control-transfer channel to one physical device
///
/// Callers must serialize access: at most one exchange is in flight per
/// device at a time. No exchange is cancellable once issued.
pub trait ControlTransport {
    /// Vendor write: one register value, no data phase
    ///
    /// `index` carries the channel-adjusted register address in the low byte
    /// and the register block in the high byte.
    fn vendor_set(&mut self, request: u8, value: u16, index: u16) -> Result<()>;

    /// Vendor read: expects exactly one byte of response payload
    ///
    /// Any other response length is a protocol violation and must surface
    /// as a transport error.
    fn vendor_get(&mut self, request: u8, index: u16) -> Result<u8>;

    /// Class request against the control interface (line coding, break)
    fn class_request(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()>;
}

impl<T: ControlTransport + ?Sized> ControlTransport for &mut T {
    fn vendor_set(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
        (**self).vendor_set(request, value, index)
    }

    fn vendor_get(&mut self, request: u8, index: u16) -> Result<u8> {
        (**self).vendor_get(request, index)
    }

    fn class_request(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()> {
        (**self).class_request(request, value, data)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;

    use super::ControlTransport;
    use crate::error::{Error, Result};

    /// One recorded control exchange
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Exchange {
        VendorSet { request: u8, value: u16, index: u16 },
        VendorGet { request: u8, index: u16 },
        Class { request: u8, value: u16, data: Vec<u8> },
    }

    /// Recording fake transport
    ///
    /// Logs every exchange in order. Reads return values seeded into
    /// `registers` (keyed by the full wIndex) and 0 otherwise. Setting
    /// `fail_at` makes the nth exchange (0-based) fail with a transport
    /// error, for exercising abort paths.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        pub log: Vec<Exchange>,
        pub registers: HashMap<u16, u8>,
        pub fail_at: Option<usize>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_at(n: usize) -> Self {
            Self {
                fail_at: Some(n),
                ..Self::default()
            }
        }

        fn check_failure(&self) -> Result<()> {
            if self.fail_at == Some(self.log.len() - 1) {
                Err(Error::TransferFailed("injected failure".into()))
            } else {
                Ok(())
            }
        }

        /// Indices of all vendor writes, for ordering assertions
        pub fn vendor_set_indices(&self) -> Vec<u16> {
            self.log
                .iter()
                .filter_map(|e| match e {
                    Exchange::VendorSet { index, .. } => Some(*index),
                    _ => None,
                })
                .collect()
        }
    }

    impl ControlTransport for MockTransport {
        fn vendor_set(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
            self.log.push(Exchange::VendorSet {
                request,
                value,
                index,
            });
            self.check_failure()?;
            self.registers.insert(index, value as u8);
            Ok(())
        }

        fn vendor_get(&mut self, request: u8, index: u16) -> Result<u8> {
            self.log.push(Exchange::VendorGet { request, index });
            self.check_failure()?;
            Ok(self.registers.get(&index).copied().unwrap_or(0))
        }

        fn class_request(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()> {
            self.log.push(Exchange::Class {
                request,
                value,
                data: data.to_vec(),
            });
            self.check_failure()
        }
    }
}
