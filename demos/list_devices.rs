//! List connected Exar bridge devices
//!
//! Run with `RUST_LOG=debug` for nusb enumeration details.

fn main() -> xr_serial::Result<()> {
    env_logger::init();

    let devices = xr_serial::list_devices()?;
    if devices.is_empty() {
        println!("no Exar bridge devices found");
        return Ok(());
    }

    for device in devices {
        println!("{device}");
    }

    Ok(())
}
