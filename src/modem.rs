//! Modem control lines
//!
//! The modem control pins sit behind the GPIO registers and are active low
//! on the wire: a polled 0 means the signal is asserted, and raising a
//! signal means clearing its GPIO bit. The translation to set/clear
//! register writes is therefore swapped relative to the logical request.

use crate::error::Result;
use crate::model::LogicalReg;
use crate::port::XrPort;
use crate::protocol::ModemPins;
use crate::transport::ControlTransport;

impl<T: ControlTransport> XrPort<T> {
    /// Read the modem status pins
    ///
    /// Returns logical state: a set bit means the signal is asserted. DTR
    /// and RTS read back the driven outputs, the rest are inputs.
    pub fn modem_status(&mut self) -> Result<ModemPins> {
        let status = self.get_reg_uart(LogicalReg::GpioStatus)?;
        // Active low: invert every polled bit
        Ok(!ModemPins::from_bits_truncate(status))
    }

    /// Assert and deassert modem control lines
    ///
    /// Only DTR and RTS are outputs; other pins in the masks are ignored.
    /// Writing 0 bits to the set/clear registers has no effect, so empty
    /// masks produce no exchange at all.
    pub fn set_modem_lines(&mut self, assert: ModemPins, deassert: ModemPins) -> Result<()> {
        let settable = ModemPins::DTR | ModemPins::RTS;

        // Active low: assert maps to the clear register and vice versa
        let gpio_clr = assert & settable;
        let gpio_set = deassert & settable;

        if !gpio_clr.is_empty() {
            self.set_reg_uart(LogicalReg::GpioClr, gpio_clr.bits().into())?;
        }
        if !gpio_set.is_empty() {
            self.set_reg_uart(LogicalReg::GpioSet, gpio_set.bits().into())?;
        }

        Ok(())
    }

    /// Raise or drop DTR and RTS together
    pub fn dtr_rts(&mut self, on: bool) -> Result<()> {
        let lines = ModemPins::DTR | ModemPins::RTS;
        if on {
            self.set_modem_lines(lines, ModemPins::empty())
        } else {
            self.set_modem_lines(ModemPins::empty(), lines)
        }
    }
}
