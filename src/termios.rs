//! Line configuration and its translation to hardware
//!
//! Character format reaches the hardware by one of two mutually exclusive
//! strategies, fixed per model: XR2280X and XR21V141X have a private
//! CHARACTER_FORMAT register (and no support for 5 or 6 data bits), the
//! other models take a standard CDC SET_LINE_CODING transfer. The strategy
//! is decided from the model's register map, never per call.

use log::debug;

use crate::error::Result;
use crate::model::LogicalReg;
use crate::port::XrPort;
use crate::protocol::*;
use crate::transport::ControlTransport;

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSize {
    Bits5,
    Bits6,
    Bits7,
    Bits8,
}

impl CharSize {
    /// Data bit count for the CDC line coding record
    pub fn bits(self) -> u8 {
        match self {
            CharSize::Bits5 => 5,
            CharSize::Bits6 => 6,
            CharSize::Bits7 => 7,
            CharSize::Bits8 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
    /// Odd parity with the mark-space modifier (stick parity)
    Mark,
    /// Even parity with the mark-space modifier (stick parity)
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    /// The hardware has no 1.5-stop-bit mode
    Two,
}

/// Requested serial line settings
///
/// A snapshot produced by the caller on every configuration change; the
/// core reads it and reports back the effective configuration, which may
/// differ where the hardware cannot honour the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    /// Requested rate in bits per second; 0 hangs up the line
    pub baud: u32,
    pub char_size: CharSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// RTS/CTS hardware flow control
    pub hard_flow: bool,
    /// XON/XOFF software flow control
    pub soft_flow: bool,
    pub xon_char: u8,
    pub xoff_char: u8,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            baud: 9600,
            char_size: CharSize::Bits8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            hard_flow: false,
            soft_flow: false,
            xon_char: 0x11, // DC1
            xoff_char: 0x13, // DC3
        }
    }
}

impl<T: ControlTransport> XrPort<T> {
    /// Apply a line configuration
    ///
    /// Returns the effective configuration, corrected where the hardware
    /// substituted a setting (unsupported character sizes, clamped baud
    /// rates). The effective configuration is also remembered for no-op
    /// detection and zero-baud transition tracking on the next call.
    pub fn set_termios(&mut self, config: &LineConfig) -> Result<LineConfig> {
        if self.model.uses_cdc_format() {
            self.set_termios_cdc(config)
        } else {
            self.set_termios_format_reg(config)
        }
    }

    /// Standard line-coding path (XR21B1411, XR21B142X)
    fn set_termios_cdc(&mut self, config: &LineConfig) -> Result<LineConfig> {
        let effective = config.clone();

        let parity = match config.parity {
            Parity::None => 0,
            Parity::Odd => 1,
            Parity::Even => 2,
            Parity::Mark => 3,
            Parity::Space => 4,
        };

        let mut line = LineCoding {
            baud: config.baud,
            stop_bits: match config.stop_bits {
                StopBits::One => 0,
                StopBits::Two => 1,
            },
            parity,
            data_bits: config.char_size.bits(),
        };

        // A zero rate hangs up the line: drop DTR and keep the last known
        // rate in the outgoing record. Otherwise make sure DTR is up.
        if config.baud == 0 {
            line.baud = self.applied.as_ref().map(|c| c.baud).unwrap_or(0);
            self.set_modem_lines(ModemPins::empty(), ModemPins::DTR)?;
        } else {
            self.set_modem_lines(ModemPins::DTR, ModemPins::empty())?;
        }

        self.set_flow_mode(&effective)?;

        self.transport
            .class_request(CDC_REQ_SET_LINE_CODING, 0, &line.to_bytes())?;

        self.applied = Some(effective.clone());
        Ok(effective)
    }

    /// Private format-register path (XR2280X, XR21V141X)
    fn set_termios_format_reg(&mut self, config: &LineConfig) -> Result<LineConfig> {
        let mut effective = config.clone();

        // Skip the divisor sequence when the rate did not change
        if self.applied.as_ref().map(|c| c.baud) != Some(config.baud) {
            let actual = self.set_baudrate(config.baud)?;
            if actual != 0 {
                effective.baud = actual;
            }
        }

        let mut bits: u16 = 0;

        match config.char_size {
            CharSize::Bits5 | CharSize::Bits6 => {
                // Not supported by the hardware; hold the previously applied
                // size, or default to 8 bits on the first configuration
                effective.char_size = self
                    .applied
                    .as_ref()
                    .map(|c| c.char_size)
                    .unwrap_or(CharSize::Bits8);
                debug!(
                    "character size {} not supported, using {}",
                    config.char_size.bits(),
                    effective.char_size.bits()
                );
            }
            CharSize::Bits7 | CharSize::Bits8 => {}
        }
        bits |= match effective.char_size {
            CharSize::Bits7 => UART_DATA_7,
            _ => UART_DATA_8,
        };

        bits |= match config.parity {
            Parity::None => UART_PARITY_NONE,
            Parity::Odd => UART_PARITY_ODD,
            Parity::Even => UART_PARITY_EVEN,
            Parity::Mark => UART_PARITY_MARK,
            Parity::Space => UART_PARITY_SPACE,
        };

        bits |= match config.stop_bits {
            StopBits::One => UART_STOP_1,
            StopBits::Two => UART_STOP_2,
        };

        self.set_reg_uart(LogicalReg::Format, bits)?;

        self.set_flow_mode(&effective)?;

        self.applied = Some(effective.clone());
        Ok(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::transport::mock::{Exchange, MockTransport};

    fn config(baud: u32) -> LineConfig {
        LineConfig {
            baud,
            ..LineConfig::default()
        }
    }

    fn format_writes(port: &XrPort<MockTransport>, format_reg: u16) -> Vec<u16> {
        port.transport
            .log
            .iter()
            .filter_map(|e| match e {
                Exchange::VendorSet { index, value, .. } if *index == format_reg => Some(*value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn format_byte_8n1() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr2280x, 0);
        port.set_termios(&config(9600)).unwrap();
        assert_eq!(format_writes(&port, 0x45), vec![0x08]);
    }

    #[test]
    fn format_byte_7e2() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr2280x, 0);
        let cfg = LineConfig {
            char_size: CharSize::Bits7,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            ..config(9600)
        };
        port.set_termios(&cfg).unwrap();
        assert_eq!(format_writes(&port, 0x45), vec![0x7 | (0x2 << 4) | (1 << 7)]);
    }

    #[test]
    fn stick_parity_modifier() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21v141x, 1);
        let cfg = LineConfig {
            parity: Parity::Mark,
            ..config(9600)
        };
        port.set_termios(&cfg).unwrap();
        assert_eq!(format_writes(&port, 0x0b), vec![0x8 | (0x3 << 4)]);

        let mut port = XrPort::new(MockTransport::new(), Model::Xr21v141x, 1);
        let cfg = LineConfig {
            parity: Parity::Space,
            ..config(9600)
        };
        port.set_termios(&cfg).unwrap();
        assert_eq!(format_writes(&port, 0x0b), vec![0x8 | (0x4 << 4)]);
    }

    #[test]
    fn char_size_5_falls_back_to_8_on_first_config() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21v141x, 1);
        let cfg = LineConfig {
            char_size: CharSize::Bits5,
            ..config(9600)
        };
        let effective = port.set_termios(&cfg).unwrap();
        assert_eq!(effective.char_size, CharSize::Bits8);
        assert_eq!(format_writes(&port, 0x0b), vec![0x08]);
    }

    #[test]
    fn char_size_6_keeps_previously_applied_size() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21v141x, 1);
        let cfg = LineConfig {
            char_size: CharSize::Bits7,
            ..config(9600)
        };
        port.set_termios(&cfg).unwrap();

        let effective = port
            .set_termios(&LineConfig {
                char_size: CharSize::Bits6,
                ..config(9600)
            })
            .unwrap();
        assert_eq!(effective.char_size, CharSize::Bits7);
        assert_eq!(port.applied.as_ref().unwrap().char_size, CharSize::Bits7);
    }

    #[test]
    fn unchanged_baud_skips_divisor_writes() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21v141x, 1);
        port.set_termios(&config(115200)).unwrap();
        assert!(port.transport.vendor_set_indices().contains(&0x04));

        port.transport.log.clear();
        port.set_termios(&config(115200)).unwrap();
        assert!(!port.transport.vendor_set_indices().contains(&0x04));

        port.transport.log.clear();
        port.set_termios(&config(9600)).unwrap();
        assert!(port.transport.vendor_set_indices().contains(&0x04));
    }

    #[test]
    fn effective_baud_reports_clamped_rate() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr2280x, 0);
        let effective = port.set_termios(&config(10)).unwrap();
        assert_eq!(effective.baud, MIN_SPEED);
    }

    #[test]
    fn cdc_path_sends_line_coding() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21b1411, 0);
        let cfg = LineConfig {
            char_size: CharSize::Bits7,
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
            ..config(115200)
        };
        port.set_termios(&cfg).unwrap();

        let coding = port.transport.log.iter().find_map(|e| match e {
            Exchange::Class { request, data, .. } if *request == CDC_REQ_SET_LINE_CODING => {
                Some(data.clone())
            }
            _ => None,
        });
        assert_eq!(coding.unwrap(), vec![0x00, 0xc2, 0x01, 0x00, 1, 1, 7]);

        // DTR asserted (active low: assert = clear register, 0xc0f)
        assert!(port.transport.log.contains(&Exchange::VendorSet {
            request: 0,
            value: 0x08,
            index: 0x0c0f,
        }));
    }

    #[test]
    fn cdc_path_zero_baud_drops_dtr_and_keeps_last_rate() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21b1411, 0);
        port.set_termios(&config(57600)).unwrap();
        port.transport.log.clear();

        port.set_termios(&config(0)).unwrap();

        let coding = port.transport.log.iter().find_map(|e| match e {
            Exchange::Class { request, data, .. } if *request == CDC_REQ_SET_LINE_CODING => {
                Some(data.clone())
            }
            _ => None,
        });
        // last known rate 57600 = 0xe100
        assert_eq!(coding.unwrap()[..4], [0x00, 0xe1, 0x00, 0x00]);

        // DTR deasserted via the set register (0xc0e)
        assert!(port.transport.log.contains(&Exchange::VendorSet {
            request: 0,
            value: 0x08,
            index: 0x0c0e,
        }));
    }

    #[test]
    fn cdc_path_does_not_touch_format_register() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21b142x, 4);
        port.set_termios(&config(9600)).unwrap();
        // no divisor writes either; rate setup is part of the line coding
        for reg in [0x04u16, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a] {
            assert!(!port.transport.vendor_set_indices().contains(&reg));
        }
    }
}
