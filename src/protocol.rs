//! Register bit layouts and protocol constants shared by all models
//!
//! Register addresses differ per model and live in [`crate::model`]; the bit
//! layouts within each register are common across the family and are
//! collected here, along with the CDC ACM request codes used by models that
//! route character format through the class protocol.

use bitflags::bitflags;

/// Internal oscillator frequency driving the baud rate generator
pub const XR_INT_OSC_HZ: u32 = 48_000_000;
/// Lowest programmable line speed
pub const MIN_SPEED: u32 = 46;
/// Highest programmable line speed (one divisor step)
pub const MAX_SPEED: u32 = XR_INT_OSC_HZ;

// Fractional baud rate generator registers (UART block)
pub const CLOCK_DIVISOR_0: u16 = 0x04;
pub const CLOCK_DIVISOR_1: u16 = 0x05;
pub const CLOCK_DIVISOR_2: u16 = 0x06;
pub const TX_CLOCK_MASK_0: u16 = 0x07;
pub const TX_CLOCK_MASK_1: u16 = 0x08;
pub const RX_CLOCK_MASK_0: u16 = 0x09;
pub const RX_CLOCK_MASK_1: u16 = 0x0a;

// Register blocks, selected by the high byte of wIndex
pub const UART_REG_BLOCK: u8 = 0;
pub const UM_REG_BLOCK: u8 = 4;

// UART manager registers (XR21V141X only)
pub const UM_FIFO_ENABLE_REG: u16 = 0x10;
pub const UM_ENABLE_TX_FIFO: u16 = 0x01;
pub const UM_ENABLE_RX_FIFO: u16 = 0x02;
pub const UM_RX_FIFO_RESET: u16 = 0x18;
pub const UM_TX_FIFO_RESET: u16 = 0x1c;

pub const UART_ENABLE_TX: u16 = 0x1;
pub const UART_ENABLE_RX: u16 = 0x2;

pub const UART_BREAK_ON: u16 = 0xff;
pub const UART_BREAK_OFF: u16 = 0;

// CHARACTER_FORMAT register fields (private-register models)
pub const UART_DATA_7: u16 = 0x7;
pub const UART_DATA_8: u16 = 0x8;

pub const UART_PARITY_SHIFT: u16 = 4;
pub const UART_PARITY_NONE: u16 = 0x0 << UART_PARITY_SHIFT;
pub const UART_PARITY_ODD: u16 = 0x1 << UART_PARITY_SHIFT;
pub const UART_PARITY_EVEN: u16 = 0x2 << UART_PARITY_SHIFT;
pub const UART_PARITY_MARK: u16 = 0x3 << UART_PARITY_SHIFT;
pub const UART_PARITY_SPACE: u16 = 0x4 << UART_PARITY_SHIFT;

pub const UART_STOP_SHIFT: u16 = 7;
pub const UART_STOP_1: u16 = 0x0 << UART_STOP_SHIFT;
pub const UART_STOP_2: u16 = 0x1 << UART_STOP_SHIFT;

// FLOW_CONTROL register values
pub const UART_FLOW_MODE_NONE: u16 = 0x0;
pub const UART_FLOW_MODE_HW: u16 = 0x1;
pub const UART_FLOW_MODE_SW: u16 = 0x2;

// GPIO_MODE register: low bits select the pin function
pub const UART_MODE_GPIO_MASK: u16 = 0x7;
pub const UART_MODE_RTS_CTS: u16 = 0x1;
/// GPIO_MODE[9:8] = '11' enables the TXT/RXT function on XR21B142X
pub const UART_MODE_TXT_RXT: u16 = 0x300;

bitflags! {
    /// Modem control pin bits as laid out in the GPIO registers
    ///
    /// The same layout is used by GPIO_DIR, GPIO_SET, GPIO_CLR and
    /// GPIO_STATUS. All pins are active low on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModemPins: u8 {
        const RI  = 1 << 0;
        const CD  = 1 << 1;
        const DSR = 1 << 2;
        const DTR = 1 << 3;
        const CTS = 1 << 4;
        const RTS = 1 << 5;
    }
}

// CDC ACM class requests, issued against the control interface
pub const CDC_REQ_SET_LINE_CODING: u8 = 0x20;
pub const CDC_REQ_SEND_BREAK: u8 = 0x23;

/// Line coding record for the CDC SET_LINE_CODING request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCoding {
    /// Data terminal rate in bits per second
    pub baud: u32,
    /// 0 = 1 stop bit, 1 = 1.5 stop bits, 2 = 2 stop bits
    pub stop_bits: u8,
    /// 0 = none, 1 = odd, 2 = even, 3 = mark, 4 = space
    pub parity: u8,
    /// Data bits: 5, 6, 7 or 8
    pub data_bits: u8,
}

impl LineCoding {
    /// Serialize to the 7-byte wire format (little-endian baud first)
    pub fn to_bytes(self) -> [u8; 7] {
        let baud = self.baud.to_le_bytes();
        [
            baud[0],
            baud[1],
            baud[2],
            baud[3],
            self.stop_bits,
            self.parity,
            self.data_bits,
        ]
    }
}
