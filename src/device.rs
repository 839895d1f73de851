//! USB device backend
//!
//! Implements [`ControlTransport`] over nusb and handles the attach-time
//! bookkeeping: model lookup from the product id, rejecting control
//! interfaces, claiming the control interface that pairs with a data
//! interface. Enumeration, hotplug and the bulk data path stay with the
//! enclosing serial framework.

use std::time::Duration;

use log::{debug, info};
use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::{DeviceInfo, Interface, MaybeFuture};

use crate::error::{Error, Result};
use crate::model::Model;
use crate::port::XrPort;
use crate::transport::ControlTransport;

const CTRL_TIMEOUT: Duration = Duration::from_secs(5);

/// Control-transfer backend for one attached bridge device
///
/// Owns the claimed control interface exclusively; dropping the transport
/// (or the port that owns it) releases the claim.
pub struct XrUsbTransport {
    interface: Interface,
    control_ifnum: u8,
}

impl ControlTransport for XrUsbTransport {
    fn vendor_set(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                CTRL_TIMEOUT,
            )
            .wait()
            .map_err(|e| Error::TransferFailed(e.to_string()))?;

        Ok(())
    }

    fn vendor_get(&mut self, request: u8, index: u16) -> Result<u8> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value: 0,
                    index,
                    length: 1,
                },
                CTRL_TIMEOUT,
            )
            .wait()
            .map_err(|e| Error::TransferFailed(e.to_string()))?;

        if data.len() != 1 {
            return Err(Error::ShortRead(data.len()));
        }

        Ok(data[0])
    }

    fn class_request(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Class,
                    recipient: Recipient::Interface,
                    request,
                    value,
                    index: self.control_ifnum.into(),
                    data,
                },
                CTRL_TIMEOUT,
            )
            .wait()
            .map_err(|e| Error::TransferFailed(e.to_string()))?;

        Ok(())
    }
}

/// Attach a port to a data interface of an Exar bridge device
///
/// The interfaces come in control/data pairs: even numbers are control
/// interfaces, odd numbers carry the data endpoints. Asked to bind an even
/// interface, this returns [`Error::NotADataInterface`] so the caller moves
/// on. The channel is derived from the data endpoint address and fixed for
/// the port's lifetime.
pub fn attach(
    device_info: &DeviceInfo,
    interface_number: u8,
    data_endpoint_address: u8,
) -> Result<XrPort<XrUsbTransport>> {
    let model = Model::from_product_id(device_info.product_id()).ok_or(Error::UnsupportedDevice {
        vendor_id: device_info.vendor_id(),
        product_id: device_info.product_id(),
    })?;

    // Attach only data interfaces; control interfaces are the even numbers
    if interface_number % 2 == 0 {
        return Err(Error::NotADataInterface(interface_number));
    }
    let control_ifnum = interface_number - interface_number % 2;

    info!(
        "attaching {:?} at bus {} address {}, data interface {}",
        model,
        device_info.busnum(),
        device_info.device_address(),
        interface_number
    );

    let device = device_info
        .open()
        .wait()
        .map_err(|e| Error::OpenFailed(e.to_string()))?;

    let interface = device
        .claim_interface(control_ifnum)
        .wait()
        .map_err(|e| Error::ClaimFailed {
            interface: control_ifnum,
            message: e.to_string(),
        })?;

    let channel = data_endpoint_address.into();
    debug!("control interface {control_ifnum} claimed, channel {channel}");

    let transport = XrUsbTransport {
        interface,
        control_ifnum,
    };

    Ok(XrPort::new(transport, model, channel))
}

/// Information about a connected Exar bridge device
#[derive(Debug, Clone)]
pub struct XrDeviceInfo {
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
    /// Chip variant, from the product id
    pub model: Model,
}

impl std::fmt::Display for XrDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} at bus {} address {}",
            self.model, self.bus, self.address
        )
    }
}

/// List all connected devices with a supported product id
pub fn list_devices() -> Result<Vec<XrDeviceInfo>> {
    let devices = nusb::list_devices()
        .wait()
        .map_err(|e| Error::OpenFailed(e.to_string()))?
        .filter(|d| d.vendor_id() == Model::USB_VENDOR)
        .filter_map(|d| {
            Model::from_product_id(d.product_id()).map(|model| XrDeviceInfo {
                bus: d.busnum(),
                address: d.device_address(),
                model,
            })
        })
        .collect();

    Ok(devices)
}
