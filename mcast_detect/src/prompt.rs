//! Interactive prompts for parameters not given on the command line.
//!
//! The group, port and timeout prompts repeat until a valid value is entered. The
//! interface prompt does not, an invalid choice aborts start-up. Closing the input
//! stream while a prompt is waiting is reported as an invalid configuration.
use std::io::{BufRead, Write};
use std::net::IpAddr;

use log::debug;
use mcast_common::config::{parse_group, parse_port, parse_timeout};
use mcast_common::{MonitorError, Result};
use pcap::Device;

use crate::interfaces::{print_devices, select_device};

/// Line-oriented prompter over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Wrap an input and an output stream.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MonitorError::InvalidConfiguration(
                "input closed before all settings were entered".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }

    fn ask_until<T>(
        &mut self,
        question: &str,
        complaint: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        loop {
            let answer = self.ask(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("Rejected input {:?}: {}", answer, e);
                    writeln!(self.output, "{}", complaint)?;
                }
            }
        }
    }

    /// List `devices` and let the user choose one.
    pub fn interface(&mut self, devices: Vec<Device>) -> Result<Device> {
        print_devices(&devices, &mut self.output)?;
        let choice = self.ask("Select a network interface (enter the number): ")?;
        select_device(devices, &choice)
    }

    /// Ask for the multicast group address.
    pub fn group(&mut self) -> Result<IpAddr> {
        self.ask_until(
            "Enter multicast address (e.g., 224.0.0.1): ",
            "Invalid address. Please enter a valid IPv4 or IPv6 address.",
            parse_group,
        )
    }

    /// Ask for the UDP port.
    pub fn port(&mut self) -> Result<u16> {
        self.ask_until(
            "Enter multicast port: ",
            "Invalid port. Please enter a valid numeric port.",
            parse_port,
        )
    }

    /// Ask for the inactivity timeout in seconds.
    pub fn timeout(&mut self) -> Result<u64> {
        self.ask_until(
            "Enter the timeout in seconds: ",
            "Invalid timeout. Please enter a valid positive integer.",
            parse_timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn reprompts_until_port_is_valid() {
        let mut p = prompter("abc\n0\n5000\n");
        assert_eq!(p.port().unwrap(), 5000);
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Enter multicast port: ").count(), 3);
        assert_eq!(shown.matches("Invalid port.").count(), 2);
    }

    #[test]
    fn reprompts_until_timeout_is_positive() {
        let mut p = prompter("-1\n0\n 7 \n");
        assert_eq!(p.timeout().unwrap(), 7);
    }

    #[test]
    fn reads_group_address() {
        let mut p = prompter("not-an-ip\n239.255.0.1\n");
        assert_eq!(p.group().unwrap(), "239.255.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompter("abc\n");
        assert!(matches!(p.port(), Err(MonitorError::InvalidConfiguration(_))));
    }
}
