//! Capture interface enumeration and selection.
use std::io::Write;

use mcast_common::{MonitorError, Result};
use pcap::Device;

/// All capture devices known to libpcap, in libpcap's order.
pub fn list_devices() -> Result<Vec<Device>> {
    let devices = Device::list().map_err(|e| MonitorError::Capture(e.to_string()))?;
    if devices.is_empty() {
        return Err(MonitorError::NoDevices);
    }
    Ok(devices)
}

/// Print a numbered device list, numbering from 1.
pub fn print_devices<W: Write>(devices: &[Device], out: &mut W) -> Result<()> {
    writeln!(out, "Available Network Interfaces:")?;
    for (i, device) in devices.iter().enumerate() {
        match &device.desc {
            Some(desc) => writeln!(out, "{}. {} ({})", i + 1, device.name, desc)?,
            None => writeln!(out, "{}. {}", i + 1, device.name)?,
        }
    }
    Ok(())
}

/// Pick a device by its list number or by its exact name.
pub fn select_device(devices: Vec<Device>, choice: &str) -> Result<Device> {
    let index = resolve_choice(devices.iter().map(|d| d.name.as_str()), choice)?;
    devices
        .into_iter()
        .nth(index)
        .ok_or_else(|| MonitorError::InvalidSelection(choice.trim().to_string()))
}

/// Index of `choice` among `names`: a 1-based number, or otherwise an exact name.
fn resolve_choice<'a, I>(names: I, choice: &str) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let choice = choice.trim();
    let names: Vec<&str> = names.into_iter().collect();
    if let Ok(number) = choice.parse::<usize>() {
        if (1..=names.len()).contains(&number) {
            return Ok(number - 1);
        }
    }
    names
        .iter()
        .position(|name| *name == choice)
        .ok_or_else(|| MonitorError::InvalidSelection(choice.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 3] = ["eth0", "lo", "wlan0"];

    #[test]
    fn selects_by_one_based_number() {
        assert_eq!(resolve_choice(NAMES, "1").unwrap(), 0);
        assert_eq!(resolve_choice(NAMES, " 3 ").unwrap(), 2);
    }

    #[test]
    fn selects_by_name() {
        assert_eq!(resolve_choice(NAMES, "lo").unwrap(), 1);
    }

    #[test]
    fn rejects_out_of_range_and_unknown() {
        for choice in ["0", "4", "eth9", ""] {
            assert!(matches!(
                resolve_choice(NAMES, choice),
                Err(MonitorError::InvalidSelection(_))
            ));
        }
    }
}
