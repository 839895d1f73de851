//! Flow control sequencing
//!
//! The FLOW_CONTROL register may only be written while the UART is
//! disabled, and the GPIO_MODE update has to follow the re-enable. The
//! ordering here is fixed by the hardware: disable, write flow mode,
//! enable, write GPIO mode.

use log::debug;

use crate::error::Result;
use crate::model::{LogicalReg, Model};
use crate::port::XrPort;
use crate::protocol::*;
use crate::termios::LineConfig;
use crate::transport::ControlTransport;

impl<T: ControlTransport> XrPort<T> {
    /// Apply the flow mode for a new line configuration
    ///
    /// Hardware flow control wins over software flow control when both are
    /// requested, except while the line is held at zero baud. Zero-baud
    /// transitions also drive DTR and RTS: dropped when the line hangs up,
    /// raised again when leaving the zero-baud state, judged against the
    /// previously applied configuration.
    pub(crate) fn set_flow_mode(&mut self, config: &LineConfig) -> Result<()> {
        let mut gpio_mode: u16 = self.get_reg_uart(LogicalReg::GpioMode)?.into();

        // Default to manual pin control
        gpio_mode &= !UART_MODE_GPIO_MASK;

        let flow = if config.hard_flow && config.baud != 0 {
            debug!("enabling hardware flow control");
            gpio_mode |= UART_MODE_RTS_CTS;
            UART_FLOW_MODE_HW
        } else if config.soft_flow {
            debug!("enabling software flow control");
            self.set_reg_uart(LogicalReg::XonChar, config.xon_char.into())?;
            self.set_reg_uart(LogicalReg::XoffChar, config.xoff_char.into())?;
            UART_FLOW_MODE_SW
        } else {
            debug!("disabling flow control");
            UART_FLOW_MODE_NONE
        };

        // GPIO_MODE[9:8] = '11' selects the TXT/RXT function on XR21B142X
        if self.model == Model::Xr21b142x {
            gpio_mode |= UART_MODE_TXT_RXT;
        }

        // The UART must be disabled while FLOW_CONTROL is written
        self.uart_disable()?;
        self.set_reg_uart(LogicalReg::FlowCtrl, flow)?;
        self.uart_enable()?;

        self.set_reg_uart(LogicalReg::GpioMode, gpio_mode)?;

        if config.baud == 0 {
            self.dtr_rts(false)?;
        } else if self.applied.as_ref().map(|c| c.baud) == Some(0) {
            self.dtr_rts(true)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termios::LineConfig;
    use crate::transport::mock::{Exchange, MockTransport};

    fn port() -> XrPort<MockTransport> {
        XrPort::new(MockTransport::new(), Model::Xr21v141x, 1)
    }

    fn flow_value(port: &XrPort<MockTransport>) -> Option<u16> {
        // XR21V141X FLOW_CONTROL register at 0x0c
        port.transport.log.iter().find_map(|e| match e {
            Exchange::VendorSet { index: 0x0c, value, .. } => Some(*value),
            _ => None,
        })
    }

    #[test]
    fn hardware_flow_wins_over_software() {
        let mut port = port();
        let config = LineConfig {
            baud: 115200,
            hard_flow: true,
            soft_flow: true,
            ..LineConfig::default()
        };
        port.set_flow_mode(&config).unwrap();

        assert_eq!(flow_value(&port), Some(UART_FLOW_MODE_HW));
        // no XON/XOFF characters written (0x10, 0x11 on XR21V141X)
        let indices = port.transport.vendor_set_indices();
        assert!(!indices.contains(&0x10));
        assert!(!indices.contains(&0x11));
    }

    #[test]
    fn software_flow_writes_chars_before_mode() {
        let mut port = port();
        let config = LineConfig {
            baud: 9600,
            soft_flow: true,
            xon_char: 0x11,
            xoff_char: 0x13,
            ..LineConfig::default()
        };
        port.set_flow_mode(&config).unwrap();

        assert_eq!(flow_value(&port), Some(UART_FLOW_MODE_SW));
        let indices = port.transport.vendor_set_indices();
        let xon = indices.iter().position(|&i| i == 0x10).unwrap();
        let flow = indices.iter().position(|&i| i == 0x0c).unwrap();
        assert!(xon < flow);
        assert_eq!(port.transport.registers[&0x10], 0x11);
        assert_eq!(port.transport.registers[&0x11], 0x13);
    }

    #[test]
    fn hardware_flow_needs_nonzero_baud() {
        let mut port = port();
        let config = LineConfig {
            baud: 0,
            hard_flow: true,
            soft_flow: true,
            ..LineConfig::default()
        };
        port.set_flow_mode(&config).unwrap();
        // falls through to software flow while hung up
        assert_eq!(flow_value(&port), Some(UART_FLOW_MODE_SW));
    }

    #[test]
    fn disable_write_enable_ordering() {
        let mut port = port();
        port.set_flow_mode(&LineConfig::default()).unwrap();

        // disable (enable reg = 0), FLOW_CONTROL, enable (enable reg = 3),
        // then GPIO_MODE last
        let writes: Vec<(u16, u16)> = port
            .transport
            .log
            .iter()
            .filter_map(|e| match e {
                Exchange::VendorSet { index, value, .. } => Some((*index, *value)),
                _ => None,
            })
            .collect();
        assert_eq!(
            writes,
            vec![
                (0x0003, 0x00), // uart disable
                (0x0410, 0x00), // fifo enables cleared
                (0x000c, 0x00), // flow mode none
                (0x0410, 0x01), // tx fifo
                (0x0003, 0x03), // uart enable
                (0x0410, 0x03), // both fifos
                (0x001a, 0x00), // gpio mode, low bits cleared
            ]
        );
    }

    #[test]
    fn txt_rxt_bits_forced_on_xr21b142x() {
        let mut port = XrPort::new(MockTransport::new(), Model::Xr21b142x, 4);
        port.set_flow_mode(&LineConfig::default()).unwrap();

        // GPIO_MODE at 0x0c on XR21B142X, high bits 9:8 set
        assert!(port.transport.log.contains(&Exchange::VendorSet {
            request: 0,
            value: 0x300,
            index: 0x0c,
        }));
    }

    #[test]
    fn gpio_mode_keeps_high_bits() {
        let mut port = port();
        // seed GPIO_MODE with function bits 0x5 and an unrelated high bit
        port.transport.registers.insert(0x1a, 0x45);
        port.set_flow_mode(&LineConfig {
            baud: 115200,
            hard_flow: true,
            ..LineConfig::default()
        })
        .unwrap();

        // low three bits replaced by RTS/CTS function, bit 6 preserved
        assert_eq!(port.transport.registers[&0x1a], 0x41);
    }

    #[test]
    fn zero_baud_drops_dtr_rts() {
        let mut port = port();
        port.set_flow_mode(&LineConfig {
            baud: 0,
            ..LineConfig::default()
        })
        .unwrap();

        // deassert = write to GPIO_SET (0x1d), both pins
        assert_eq!(
            port.transport.log.last(),
            Some(&Exchange::VendorSet {
                request: 0,
                value: 0x28,
                index: 0x1d,
            })
        );
    }

    #[test]
    fn leaving_zero_baud_raises_dtr_rts() {
        let mut port = port();
        port.applied = Some(LineConfig {
            baud: 0,
            ..LineConfig::default()
        });
        port.set_flow_mode(&LineConfig::default()).unwrap();

        // assert = write to GPIO_CLR (0x1e), both pins
        assert_eq!(
            port.transport.log.last(),
            Some(&Exchange::VendorSet {
                request: 0,
                value: 0x28,
                index: 0x1e,
            })
        );
    }

    #[test]
    fn steady_nonzero_baud_leaves_lines_alone() {
        let mut port = port();
        port.applied = Some(LineConfig::default());
        port.set_flow_mode(&LineConfig::default()).unwrap();

        let indices = port.transport.vendor_set_indices();
        assert!(!indices.contains(&0x1d));
        assert!(!indices.contains(&0x1e));
    }
}
