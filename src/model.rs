//! Model registry: chip variants, register maps and request codes
//!
//! The four supported bridge chips expose the same logical registers at
//! different physical addresses, with different vendor request codes and
//! different channel addressing rules. Everything model-specific that can be
//! resolved statically lives here; the rest of the crate only ever asks for
//! a [`LogicalReg`] and lets this table translate it.

/// Supported chip variants
///
/// Assigned once at attach time from the product id and immutable for the
/// lifetime of the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// XR22804 family, 0x04e2:0x1400..0x1403
    Xr2280x,
    /// XR21B1411, 0x04e2:0x1411
    Xr21b1411,
    /// XR21V141X family, 0x04e2:0x1410/0x1412/0x1414
    Xr21v141x,
    /// XR21B142X family, 0x04e2:0x1420/0x1422/0x1424
    Xr21b142x,
}

/// Logical register identifiers, independent of any model's address map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalReg {
    Enable,
    Format,
    FlowCtrl,
    XonChar,
    XoffChar,
    TxBreak,
    Rs485Delay,
    GpioMode,
    GpioDir,
    GpioSet,
    GpioClr,
    GpioStatus,
    GpioIntMask,
    CustomizedInt,
    GpioPullUpEnable,
    GpioPullDownEnable,
    Loopback,
    LowLatency,
    CustomDriver,
}

/// Where a logical register lives on a given model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAddr {
    /// Vendor register at this physical address
    Reg(u16),
    /// No vendor register; the setting travels over the CDC class protocol
    ViaCdc,
}

/// Channel address adjustment, selected once at attach time
pub type AddrAdjust = fn(reg: u16, channel: u16) -> u16;

fn adjust_identity(reg: u16, _channel: u16) -> u16 {
    reg
}

fn adjust_xr21v141x(reg: u16, channel: u16) -> u16 {
    if channel != 0 {
        reg | ((channel - 1) << 8)
    } else {
        reg
    }
}

fn adjust_xr21b142x(reg: u16, channel: u16) -> u16 {
    reg | (channel.wrapping_sub(4) << 1)
}

impl Model {
    /// USB vendor id shared by the whole family
    pub const USB_VENDOR: u16 = 0x04e2;

    /// Look up the model for a product id
    pub fn from_product_id(product_id: u16) -> Option<Model> {
        match product_id {
            0x1400..=0x1403 => Some(Model::Xr2280x),
            0x1410 | 0x1412 | 0x1414 => Some(Model::Xr21v141x),
            0x1411 => Some(Model::Xr21b1411),
            0x1420 | 0x1422 | 0x1424 => Some(Model::Xr21b142x),
            _ => None,
        }
    }

    /// Vendor request codes as (set, get)
    pub fn request_codes(self) -> (u8, u8) {
        match self {
            Model::Xr2280x => (5, 5),
            Model::Xr21b1411 => (0, 1),
            Model::Xr21v141x => (0, 1),
            Model::Xr21b142x => (0, 0),
        }
    }

    /// Channel address adjustment for this model
    ///
    /// XR2280X and XR21B1411 address every channel identically. XR21V141X
    /// moves the channel number into the high address byte, XR21B142X packs
    /// it into the low address bits.
    pub fn addr_adjust(self) -> AddrAdjust {
        match self {
            Model::Xr2280x | Model::Xr21b1411 => adjust_identity,
            Model::Xr21v141x => adjust_xr21v141x,
            Model::Xr21b142x => adjust_xr21b142x,
        }
    }

    /// Whether character format is programmed through the CDC class protocol
    /// instead of a private format register
    pub fn uses_cdc_format(self) -> bool {
        matches!(self.register(LogicalReg::Format), Some(RegisterAddr::ViaCdc))
    }

    /// Resolve a logical register to its location on this model
    ///
    /// `None` means the register simply does not exist on this chip; the
    /// closed set of callers never asks for those, so a `None` escaping to
    /// a register access is a programming error.
    pub fn register(self, reg: LogicalReg) -> Option<RegisterAddr> {
        use LogicalReg::*;
        use RegisterAddr::*;

        let addr = match self {
            Model::Xr2280x => match reg {
                Enable => Reg(0x40),
                Format => Reg(0x45),
                FlowCtrl => Reg(0x46),
                XonChar => Reg(0x47),
                XoffChar => Reg(0x48),
                TxBreak => Reg(0x4a),
                Rs485Delay => Reg(0x4b),
                GpioMode => Reg(0x4c),
                GpioDir => Reg(0x4d),
                GpioSet => Reg(0x4e),
                GpioClr => Reg(0x4f),
                GpioStatus => Reg(0x50),
                GpioIntMask => Reg(0x51),
                CustomizedInt => Reg(0x52),
                GpioPullUpEnable => Reg(0x54),
                GpioPullDownEnable => Reg(0x55),
                Loopback => Reg(0x56),
                LowLatency => Reg(0x66),
                CustomDriver => Reg(0x81),
            },
            Model::Xr21b1411 => match reg {
                Enable => Reg(0xc00),
                Format => ViaCdc,
                FlowCtrl => Reg(0xc06),
                XonChar => Reg(0xc07),
                XoffChar => Reg(0xc08),
                TxBreak => Reg(0xc0a),
                Rs485Delay => Reg(0xc0b),
                GpioMode => Reg(0xc0c),
                GpioDir => Reg(0xc0d),
                GpioSet => Reg(0xc0e),
                GpioClr => Reg(0xc0f),
                GpioStatus => Reg(0xc10),
                GpioIntMask => Reg(0xc11),
                CustomizedInt => Reg(0xc12),
                GpioPullUpEnable => Reg(0xc14),
                GpioPullDownEnable => Reg(0xc15),
                Loopback => Reg(0xc16),
                LowLatency => Reg(0xcc2),
                CustomDriver => Reg(0x20d),
            },
            Model::Xr21v141x => match reg {
                Enable => Reg(0x03),
                Format => Reg(0x0b),
                FlowCtrl => Reg(0x0c),
                XonChar => Reg(0x10),
                XoffChar => Reg(0x11),
                Loopback => Reg(0x12),
                TxBreak => Reg(0x14),
                Rs485Delay => Reg(0x15),
                GpioMode => Reg(0x1a),
                GpioDir => Reg(0x1b),
                GpioIntMask => Reg(0x1c),
                GpioSet => Reg(0x1d),
                GpioClr => Reg(0x1e),
                GpioStatus => Reg(0x1f),
                CustomizedInt | GpioPullUpEnable | GpioPullDownEnable | LowLatency
                | CustomDriver => return None,
            },
            Model::Xr21b142x => match reg {
                Enable => Reg(0x00),
                Format => ViaCdc,
                FlowCtrl => Reg(0x06),
                XonChar => Reg(0x07),
                XoffChar => Reg(0x08),
                TxBreak => Reg(0x0a),
                Rs485Delay => Reg(0x0b),
                GpioMode => Reg(0x0c),
                GpioDir => Reg(0x0d),
                GpioSet => Reg(0x0e),
                GpioClr => Reg(0x0f),
                GpioStatus => Reg(0x10),
                GpioIntMask => Reg(0x11),
                CustomizedInt => Reg(0x12),
                GpioPullUpEnable => Reg(0x14),
                GpioPullDownEnable => Reg(0x15),
                Loopback => Reg(0x16),
                LowLatency => Reg(0x46),
                CustomDriver => Reg(0x60),
            },
        };

        Some(addr)
    }
}
