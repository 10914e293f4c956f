//! Command-line arguments for the multicast detector.
//!
//! Every monitoring parameter is optional here; whatever is missing is asked for
//! interactively at start-up (see `prompt`).
use clap::Parser;
use mcast_common::notice::OutputFormat;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Warn when more than one source transmits to a multicast group", long_about = None)]
pub struct Args {
    /// Capture interface, by name or by its number in `--list-interfaces`.
    #[clap(long, short)]
    pub interface: Option<String>,

    /// Multicast group address to watch (IPv4 or IPv6).
    #[clap(long, short)]
    pub group: Option<String>,

    /// UDP port of the multicast stream.
    #[clap(long, short)]
    pub port: Option<String>,

    /// Inactivity timeout in seconds.
    #[clap(long, short)]
    pub timeout: Option<String>,

    /// How notices are printed.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the available capture interfaces and exit.
    #[clap(long)]
    pub list_interfaces: bool,

    /// Enable debug logging.
    #[clap(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_parameters_are_optional() {
        let args = Args::try_parse_from(["mcast_detect"]).unwrap();
        assert!(args.interface.is_none());
        assert!(args.group.is_none());
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.list_interfaces);
    }

    #[test]
    fn parses_full_command_line() {
        let args = Args::try_parse_from([
            "mcast_detect",
            "--interface",
            "eth0",
            "--group",
            "239.1.1.1",
            "--port",
            "5000",
            "--timeout",
            "5",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.interface.as_deref(), Some("eth0"));
        assert_eq!(args.group.as_deref(), Some("239.1.1.1"));
        assert_eq!(args.port.as_deref(), Some("5000"));
        assert_eq!(args.timeout.as_deref(), Some("5"));
        assert_eq!(args.format, OutputFormat::Json);
    }
}
