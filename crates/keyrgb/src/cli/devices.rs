//! `devices` subcommand: list connected SONiX keyboard endpoints.

use keyrgb_lib::device::DeviceError;
use keyrgb_lib::protocol::{KEYBOARD_PID, SONIX_VID};

use super::{DeviceChannel, DevicesOutput, HidapiChannel, Result, print_json};

pub(super) fn cmd_devices(json: bool) -> Result<()> {
    let devices = match HidapiChannel::new() {
        Ok(channel) => channel.enumerate(SONIX_VID, KEYBOARD_PID),
        Err(e @ DeviceError::BackendUnavailable(_)) => {
            log::warn!("{e}");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&DevicesOutput {
            count: devices.len(),
            devices,
        });
    }

    if devices.is_empty() {
        println!("No SONiX keyboards found ({SONIX_VID:04x}:{KEYBOARD_PID:04x}).");
        return Ok(());
    }

    println!(
        "Found {} endpoint{}:",
        devices.len(),
        if devices.len() == 1 { "" } else { "s" }
    );
    println!();

    for (i, dev) in devices.iter().enumerate() {
        let marker = if dev.is_lighting_interface() {
            "  (lighting)"
        } else {
            ""
        };
        println!("  [{}] {}{marker}", i + 1, dev.path);
        println!(
            "      {}  usage {:04x}:{:04x}",
            dev.display_name(),
            dev.usage_page,
            dev.usage
        );
        if let Some(ref serial) = dev.serial {
            println!("      Serial: {serial}");
        }
    }

    Ok(())
}
