//! Port state and open/close lifecycle
//!
//! An [`XrPort`] owns the control-transfer handle for one logical UART
//! channel. It is created at attach time, carries the model and channel for
//! the port's whole lifetime and releases the handle exactly once when
//! dropped. The open/close sequencing follows the datasheet ordering; none
//! of the transitions retry, the first failed register write aborts.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{AddrAdjust, LogicalReg, Model, RegisterAddr};
use crate::protocol::*;
use crate::termios::LineConfig;
use crate::transport::ControlTransport;

/// The generic bulk data path, owned by the enclosing serial framework
///
/// The port only ever starts and stops it; buffering and flow-controlled
/// byte streaming happen elsewhere.
pub trait DataStream {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
}

/// One logical UART channel on an attached bridge chip
pub struct XrPort<T: ControlTransport> {
    pub(crate) transport: T,
    pub(crate) model: Model,
    pub(crate) channel: u16,
    adjust: AddrAdjust,
    req_set: u8,
    req_get: u8,
    /// Last applied line configuration, None before the first one
    pub(crate) applied: Option<LineConfig>,
}

impl<T: ControlTransport> XrPort<T> {
    /// Bind a port to its control transport
    ///
    /// `model` and `channel` are fixed here for the port's lifetime; the
    /// address adjustment and request codes are resolved once instead of on
    /// every register access.
    pub fn new(transport: T, model: Model, channel: u16) -> Self {
        let (req_set, req_get) = model.request_codes();
        Self {
            transport,
            model,
            channel,
            adjust: model.addr_adjust(),
            req_set,
            req_get,
            applied: None,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Last applied line configuration, if any
    pub fn line_config(&self) -> Option<&LineConfig> {
        self.applied.as_ref()
    }

    /// Release the port and hand back the transport handle
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn index_for(&self, block: u8, reg: u16) -> u16 {
        (self.adjust)(reg, self.channel) | ((block as u16) << 8)
    }

    /// Write a register at a raw UART-block address
    pub(crate) fn set_reg_uart_raw(&mut self, reg: u16, val: u16) -> Result<()> {
        let index = self.index_for(UART_REG_BLOCK, reg);
        self.transport.vendor_set(self.req_set, val, index)
    }

    fn resolve(&self, reg: LogicalReg) -> Result<u16> {
        match self.model.register(reg) {
            Some(RegisterAddr::Reg(addr)) => Ok(addr),
            Some(RegisterAddr::ViaCdc) | None => Err(Error::UnsupportedRegister {
                model: self.model,
                reg,
            }),
        }
    }

    /// Write a logical register in the UART block
    pub(crate) fn set_reg_uart(&mut self, reg: LogicalReg, val: u16) -> Result<()> {
        let addr = self.resolve(reg)?;
        self.set_reg_uart_raw(addr, val)
    }

    /// Read a logical register in the UART block
    pub(crate) fn get_reg_uart(&mut self, reg: LogicalReg) -> Result<u8> {
        let addr = self.resolve(reg)?;
        let index = self.index_for(UART_REG_BLOCK, addr);
        self.transport.vendor_get(self.req_get, index)
    }

    /// Write a register in the UART manager block
    pub(crate) fn set_reg_um(&mut self, reg: u16, val: u16) -> Result<()> {
        let index = self.index_for(UM_REG_BLOCK, reg);
        self.transport.vendor_set(self.req_set, val, index)
    }

    /// Enable the UART
    ///
    /// The XR21V141X datasheet requires: enable the tx FIFO, enable tx and
    /// rx, enable both FIFOs, in that order. If the final FIFO enable fails
    /// the UART enable is rolled back. Other models enable tx and rx with a
    /// single write.
    pub(crate) fn uart_enable(&mut self) -> Result<()> {
        if self.model != Model::Xr21v141x {
            return self.set_reg_uart(LogicalReg::Enable, UART_ENABLE_TX | UART_ENABLE_RX);
        }

        self.set_reg_um(UM_FIFO_ENABLE_REG, UM_ENABLE_TX_FIFO)?;
        self.set_reg_uart(LogicalReg::Enable, UART_ENABLE_TX | UART_ENABLE_RX)?;

        if let Err(err) = self.set_reg_um(UM_FIFO_ENABLE_REG, UM_ENABLE_TX_FIFO | UM_ENABLE_RX_FIFO)
        {
            if let Err(rollback) = self.set_reg_uart(LogicalReg::Enable, 0) {
                warn!("failed to roll back UART enable: {rollback}");
            }
            return Err(err);
        }

        Ok(())
    }

    /// Disable the UART; on XR21V141X also clear the FIFO enables
    pub(crate) fn uart_disable(&mut self) -> Result<()> {
        self.set_reg_uart(LogicalReg::Enable, 0)?;

        if self.model != Model::Xr21v141x {
            return Ok(());
        }

        self.set_reg_um(UM_FIFO_ENABLE_REG, 0)
    }

    /// Reset the rx and tx FIFOs (no-op on models without per-channel
    /// FIFO reset registers)
    fn fifo_reset(&mut self) -> Result<()> {
        if self.model != Model::Xr21v141x {
            return Ok(());
        }

        let channel = self.channel.saturating_sub(1);
        self.set_reg_um(UM_RX_FIFO_RESET + channel, 0xff)?;
        self.set_reg_um(UM_TX_FIFO_RESET + channel, 0xff)
    }

    /// Open the port: enable the UART, configure GPIO directions, reset the
    /// FIFOs, apply the initial line configuration and start the data
    /// stream. A stream start failure disables the UART again before
    /// surfacing the error.
    pub fn open(
        &mut self,
        stream: &mut dyn DataStream,
        initial: Option<&LineConfig>,
    ) -> Result<LineConfig> {
        self.uart_enable()?;

        // DTR and RTS as outputs, RI, CD, DSR and CTS stay inputs
        let gpio_dir = ModemPins::DTR | ModemPins::RTS;
        self.set_reg_uart(LogicalReg::GpioDir, gpio_dir.bits().into())?;

        self.fifo_reset()?;

        let effective = match initial {
            Some(config) => self.set_termios(config)?,
            None => self.applied.clone().unwrap_or_default(),
        };

        if let Err(err) = stream.start() {
            if let Err(disable) = self.uart_disable() {
                warn!("failed to disable UART after open failure: {disable}");
            }
            return Err(err);
        }

        Ok(effective)
    }

    /// Close the port: stop the data stream, then disable the UART
    pub fn close(&mut self, stream: &mut dyn DataStream) -> Result<()> {
        stream.stop();
        self.uart_disable()
    }

    /// Start or stop transmitting a break condition
    pub fn break_ctl(&mut self, on: bool) -> Result<()> {
        if self.model != Model::Xr21v141x {
            // Break duration 0xffff holds the break until cleared
            let duration = if on { 0xffff } else { 0 };
            return self
                .transport
                .class_request(CDC_REQ_SEND_BREAK, duration, &[]);
        }

        let state = if on { UART_BREAK_ON } else { UART_BREAK_OFF };
        debug!("turning break {}", if on { "on" } else { "off" });
        self.set_reg_uart(LogicalReg::TxBreak, state)
    }
}
