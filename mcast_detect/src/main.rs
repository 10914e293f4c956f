//! Multicast source detector.
//!
//! This binary captures live traffic for one multicast group and UDP port and reports,
//! line by line, every packet's source, any moment when more than one source transmits
//! to the group, sources that fall silent, and periods with no traffic at all. It wires
//! together three main building blocks:
//!
//! - `PacketCapture` — a libpcap handle filtered to `ip and udp and host <group> and
//!   port <port>`, decoding each frame into a `PacketEvent` sent over a
//!   `crossbeam_channel`.
//! - `Engine` (from `mcast_engine`) — a dedicated thread that owns the source registry
//!   and multiplexes packet events, the 100 ms sweep tick and shutdown with `select!`.
//! - `ConsoleSink` — renders the engine's notices to stdout as text or JSON lines.
//!
//! Configuration:
//! - Interface, group, port and timeout can be passed as flags; anything missing is
//!   prompted for interactively.
//! - Log verbosity follows `RUST_LOG`, defaulting to `info` (`debug` with `--verbose`).
//!
//! Shutdown:
//! - Ctrl+C sets the capture thread's shutdown flag and signals the engine. The capture
//!   loop exits within one read timeout, dropping its sender, and the engine returns its
//!   final state, which is summarised in the log.
#![warn(missing_docs)]
mod args;
mod capture;
mod console;
mod decode;
mod interfaces;
mod prompt;

use crate::args::Args;
use crate::capture::PacketCapture;
use crate::console::{ClockAnchor, ConsoleSink};
use crate::interfaces::{list_devices, print_devices, select_device};
use crate::prompt::Prompter;
use clap::Parser;
use crossbeam_channel::{bounded, unbounded};
use log::{info, warn};
use mcast_common::config::{parse_group, parse_port, parse_timeout};
use mcast_common::{MonitorConfig, MonitorError, Result};
use mcast_engine::{Engine, Monitor, PacketEvent};
use std::io::{self, BufRead, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Instant;

/// Combine command-line values with prompted ones into a validated configuration.
///
/// Values given as flags are validated once and fail start-up when invalid; prompted
/// values are asked for again until they parse.
fn resolve_config<R: BufRead, W: Write>(
    args: &Args,
    prompter: &mut Prompter<R, W>,
) -> Result<MonitorConfig> {
    let group = match &args.group {
        Some(raw) => parse_group(raw)?,
        None => prompter.group()?,
    };
    let port = match &args.port {
        Some(raw) => parse_port(raw)?,
        None => prompter.port()?,
    };
    let timeout = match &args.timeout {
        Some(raw) => parse_timeout(raw)?,
        None => prompter.timeout()?,
    };
    MonitorConfig::from_parts(group, port, timeout)
}

fn main() -> Result<(), MonitorError> {
    let args = Args::parse();
    init_logger(args.verbose);

    let devices = list_devices()?;
    if args.list_interfaces {
        print_devices(&devices, &mut io::stdout())?;
        return Ok(());
    }

    let (device, config) = {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        let device = match &args.interface {
            Some(choice) => select_device(devices, choice)?,
            None => prompter.interface(devices)?,
        };
        (device, resolve_config(&args, &mut prompter)?)
    };

    let capture = PacketCapture::open(device, &config)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (stop_tx, stop_rx) = bounded::<()>(1);
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down...");
            shutdown.store(true, Ordering::SeqCst);
            let _ = stop_tx.try_send(());
        })
        .map_err(|e| MonitorError::Io(io::Error::other(e.to_string())))?;
    }

    let (event_tx, event_rx) = unbounded::<PacketEvent>();
    let sink = ConsoleSink::new(io::stdout(), args.format, ClockAnchor::now(), config.timeout);
    let monitor = Monitor::from_config(&config, Instant::now());
    let engine = Engine::new(monitor, sink).spawn(event_rx, stop_rx)?;

    let capture_shutdown = Arc::clone(&shutdown);
    let capture_thread = thread::Builder::new()
        .name("mcast-capture".to_string())
        .spawn(move || capture.run(event_tx, capture_shutdown))?;

    info!(
        "Monitoring {} port {} (timeout {}s). Press Ctrl+C to exit.",
        config.group,
        config.port,
        config.timeout.as_secs()
    );

    let capture_result = capture_thread
        .join()
        .map_err(|_| MonitorError::ThreadPanicked("capture".to_string()))?;
    let outcome = engine
        .join()
        .map_err(|_| MonitorError::ThreadPanicked("engine".to_string()))?;

    info!("Processed {} packets ({:?})", outcome.events, outcome.reason);
    for (group, sources) in outcome.monitor.snapshot() {
        let list: Vec<String> = sources.keys().map(|s| s.to_string()).collect();
        info!("Active sources for {} at exit: {}", group, list.join(", "));
    }
    match capture_result {
        Ok(stats) => {
            info!("Capture summary: {}", stats);
            Ok(())
        }
        Err(e) => {
            warn!("Capture ended with an error: {}", e);
            Err(e)
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn flags_skip_prompts() {
        let args = Args::try_parse_from([
            "mcast_detect", "--group", "239.1.1.1", "--port", "5000", "--timeout", "3",
        ])
        .unwrap();
        let mut prompter = Prompter::new(Cursor::new(Vec::<u8>::new()), Vec::<u8>::new());
        let config = resolve_config(&args, &mut prompter).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn missing_flags_are_prompted() {
        let args = Args::try_parse_from(["mcast_detect", "--port", "6000"]).unwrap();
        let mut prompter = Prompter::new(Cursor::new(b"239.2.2.2\nx\n10\n".to_vec()), Vec::<u8>::new());
        let config = resolve_config(&args, &mut prompter).unwrap();
        assert_eq!(config.group.to_string(), "239.2.2.2");
        assert_eq!(config.port, 6000);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn invalid_flag_fails_without_prompting() {
        let args = Args::try_parse_from(["mcast_detect", "--timeout", "0", "--group", "239.1.1.1", "--port", "1"])
            .unwrap();
        let mut prompter = Prompter::new(Cursor::new(b"5\n".to_vec()), Vec::<u8>::new());
        assert!(matches!(
            resolve_config(&args, &mut prompter),
            Err(MonitorError::InvalidConfiguration(_))
        ));
    }
}
