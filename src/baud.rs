//! Fractional baud rate generator
//!
//! The bridge derives its bit clock from a 48 MHz internal oscillator
//! through a 19-bit integer divisor plus a pair of 12-bit clock masks that
//! select which oscillator edges contribute to the tx and rx clocks. The
//! masks give fractional accuracy beyond the integer divisor, so most
//! common rates come out nearly exact.

use log::debug;

use crate::error::Result;
use crate::port::XrPort;
use crate::protocol::*;
use crate::transport::ControlTransport;

struct TxRxClkMask {
    tx: u16,
    rx0: u16,
    rx1: u16,
}

// Tx and Rx clock mask values from section 3.3.4 of the XR21V141X datasheet
#[rustfmt::skip]
static TXRX_CLK_MASKS: [TxRxClkMask; 32] = [
    TxRxClkMask { tx: 0x000, rx0: 0x000, rx1: 0x000 },
    TxRxClkMask { tx: 0x000, rx0: 0x000, rx1: 0x000 },
    TxRxClkMask { tx: 0x100, rx0: 0x000, rx1: 0x100 },
    TxRxClkMask { tx: 0x020, rx0: 0x400, rx1: 0x020 },
    TxRxClkMask { tx: 0x010, rx0: 0x100, rx1: 0x010 },
    TxRxClkMask { tx: 0x208, rx0: 0x040, rx1: 0x208 },
    TxRxClkMask { tx: 0x104, rx0: 0x820, rx1: 0x108 },
    TxRxClkMask { tx: 0x844, rx0: 0x210, rx1: 0x884 },
    TxRxClkMask { tx: 0x444, rx0: 0x110, rx1: 0x444 },
    TxRxClkMask { tx: 0x122, rx0: 0x888, rx1: 0x224 },
    TxRxClkMask { tx: 0x912, rx0: 0x448, rx1: 0x924 },
    TxRxClkMask { tx: 0x492, rx0: 0x248, rx1: 0x492 },
    TxRxClkMask { tx: 0x252, rx0: 0x928, rx1: 0x292 },
    TxRxClkMask { tx: 0x94a, rx0: 0x4a4, rx1: 0xa52 },
    TxRxClkMask { tx: 0x52a, rx0: 0xaa4, rx1: 0x54a },
    TxRxClkMask { tx: 0xaaa, rx0: 0x954, rx1: 0x4aa },
    TxRxClkMask { tx: 0xaaa, rx0: 0x554, rx1: 0xaaa },
    TxRxClkMask { tx: 0x555, rx0: 0xad4, rx1: 0x5aa },
    TxRxClkMask { tx: 0xb55, rx0: 0xab4, rx1: 0x55a },
    TxRxClkMask { tx: 0x6b5, rx0: 0x5ac, rx1: 0xb56 },
    TxRxClkMask { tx: 0x5b5, rx0: 0xd6c, rx1: 0x6d6 },
    TxRxClkMask { tx: 0xb6d, rx0: 0xb6a, rx1: 0xdb6 },
    TxRxClkMask { tx: 0x76d, rx0: 0x6da, rx1: 0xbb6 },
    TxRxClkMask { tx: 0xedd, rx0: 0xdda, rx1: 0x76e },
    TxRxClkMask { tx: 0xddd, rx0: 0xbba, rx1: 0xeee },
    TxRxClkMask { tx: 0x7bb, rx0: 0xf7a, rx1: 0xdde },
    TxRxClkMask { tx: 0xf7b, rx0: 0xef6, rx1: 0x7de },
    TxRxClkMask { tx: 0xdf7, rx0: 0xbf6, rx1: 0xf7e },
    TxRxClkMask { tx: 0x7f7, rx0: 0xfee, rx1: 0xefe },
    TxRxClkMask { tx: 0xfdf, rx0: 0xfbe, rx1: 0x7fe },
    TxRxClkMask { tx: 0xf7f, rx0: 0xefe, rx1: 0xffe },
    TxRxClkMask { tx: 0xfff, rx0: 0xffe, rx1: 0xffd },
];

/// Divisor and clock masks for one programmed rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudSetting {
    /// Effective rate after clamping to [46, 48_000_000]
    pub baud: u32,
    pub divisor: u32,
    pub tx_mask: u16,
    pub rx_mask: u16,
}

/// Compute the divisor and clock masks for a requested rate
///
/// Returns `None` for a rate of 0, which means "hold the current
/// configuration" and must not touch the hardware.
pub fn baud_setting(requested: u32) -> Option<BaudSetting> {
    if requested == 0 {
        return None;
    }

    let baud = requested.clamp(MIN_SPEED, MAX_SPEED);
    let divisor = XR_INT_OSC_HZ / baud;
    let idx = (((32 * XR_INT_OSC_HZ as u64) / baud as u64) & 0x1f) as usize;
    let masks = &TXRX_CLK_MASKS[idx];

    let rx_mask = if divisor & 0x01 != 0 {
        masks.rx1
    } else {
        masks.rx0
    };

    Some(BaudSetting {
        baud,
        divisor,
        tx_mask: masks.tx,
        rx_mask,
    })
}

impl<T: ControlTransport> XrPort<T> {
    /// Program the fractional baud rate generator
    ///
    /// Writes three divisor bytes, then the tx mask, then the rx mask, in
    /// that fixed order. The first failed write aborts the sequence; no
    /// rollback is attempted, the next full reconfiguration rewrites every
    /// register anyway. Returns the effective (clamped) rate, or 0 when the
    /// request was 0 and nothing was written.
    pub(crate) fn set_baudrate(&mut self, requested: u32) -> Result<u32> {
        let Some(setting) = baud_setting(requested) else {
            return Ok(0);
        };

        debug!(
            "setting baud rate {} (divisor {}, tx mask {:#05x}, rx mask {:#05x})",
            setting.baud, setting.divisor, setting.tx_mask, setting.rx_mask
        );

        self.set_reg_uart_raw(CLOCK_DIVISOR_0, (setting.divisor & 0xff) as u16)?;
        self.set_reg_uart_raw(CLOCK_DIVISOR_1, ((setting.divisor >> 8) & 0xff) as u16)?;
        self.set_reg_uart_raw(CLOCK_DIVISOR_2, ((setting.divisor >> 16) & 0xff) as u16)?;
        self.set_reg_uart_raw(TX_CLOCK_MASK_0, setting.tx_mask & 0xff)?;
        self.set_reg_uart_raw(TX_CLOCK_MASK_1, (setting.tx_mask >> 8) & 0xff)?;
        self.set_reg_uart_raw(RX_CLOCK_MASK_0, setting.rx_mask & 0xff)?;
        self.set_reg_uart_raw(RX_CLOCK_MASK_1, (setting.rx_mask >> 8) & 0xff)?;

        Ok(setting.baud)
    }
}
