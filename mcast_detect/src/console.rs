//! Console rendering of engine notices.
//!
//! Notices carry monotonic instants. `ClockAnchor` pairs one `Instant` with the local
//! wall-clock time taken at the same moment, so every notice can be printed with a
//! `HH:MM:SS.fff` timestamp without ever consulting the wall clock inside the engine.
use std::io::Write;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, SecondsFormat, TimeDelta};
use log::error;
use mcast_common::Notice;
use mcast_common::notice::{NoticeKind, OutputFormat};
use mcast_engine::AlertSink;
use serde::Serialize;

/// Fixed correspondence between the monotonic clock and local wall time.
#[derive(Debug, Clone, Copy)]
pub struct ClockAnchor {
    instant: Instant,
    wall: DateTime<Local>,
}

impl ClockAnchor {
    /// Anchor taken right now.
    pub fn now() -> Self {
        Self::new(Instant::now(), Local::now())
    }

    /// Anchor from an explicit pair.
    pub fn new(instant: Instant, wall: DateTime<Local>) -> Self {
        Self { instant, wall }
    }

    /// Local wall time corresponding to `at`.
    pub fn wall_time(&self, at: Instant) -> DateTime<Local> {
        let shifted = if at >= self.instant {
            TimeDelta::from_std(at - self.instant)
                .ok()
                .and_then(|d| self.wall.checked_add_signed(d))
        } else {
            TimeDelta::from_std(self.instant - at)
                .ok()
                .and_then(|d| self.wall.checked_sub_signed(d))
        };
        shifted.unwrap_or(self.wall)
    }
}

#[derive(Debug, Serialize)]
struct NoticeRecord {
    time: String,
    kind: NoticeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

/// Writes one line per notice, as text or JSON.
pub struct ConsoleSink<W> {
    out: W,
    format: OutputFormat,
    anchor: ClockAnchor,
    timeout: Duration,
}

impl<W: Write> ConsoleSink<W> {
    /// Sink writing to `out`; `timeout` is quoted in global-timeout lines.
    pub fn new(out: W, format: OutputFormat, anchor: ClockAnchor, timeout: Duration) -> Self {
        Self {
            out,
            format,
            anchor,
            timeout,
        }
    }

    /// Render a notice without writing it.
    pub fn render(&self, notice: &Notice) -> mcast_common::Result<String> {
        let time = self.anchor.wall_time(notice.at());
        match self.format {
            OutputFormat::Text => Ok(self.render_text(notice, time)),
            OutputFormat::Json => {
                let record = NoticeRecord {
                    time: time.to_rfc3339_opts(SecondsFormat::Millis, false),
                    kind: notice.kind(),
                    source: notice.source(),
                    group: notice.group(),
                    timeout_secs: matches!(notice, Notice::GlobalTimeout { .. })
                        .then_some(self.timeout.as_secs()),
                };
                Ok(serde_json::to_string(&record)?)
            }
        }
    }

    fn render_text(&self, notice: &Notice, time: DateTime<Local>) -> String {
        let stamp = time.format("%H:%M:%S%.3f");
        match notice {
            Notice::NewSource { source, group, .. } => {
                format!("{}: New source {} for multicast address {}", stamp, source, group)
            }
            Notice::MultiSourceWarning { group, .. } => format!(
                "{}: Warning: Multiple sources transmitting on multicast address {}",
                stamp, group
            ),
            Notice::SourceEvicted { source, group, .. } => format!(
                "{}: Removed inactive source {} for multicast address {}",
                stamp, source, group
            ),
            Notice::GlobalTimeout { .. } => format!(
                "{}: Timeout reached. No packets received within the last {} seconds.",
                stamp,
                self.timeout.as_secs()
            ),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AlertSink for ConsoleSink<W> {
    fn notify(&mut self, notice: Notice) {
        let line = match self.render(&notice) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to render notice {:?}: {}", notice.kind(), e);
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{}", line) {
            error!("Failed to write notice: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sink(format: OutputFormat) -> (ConsoleSink<Vec<u8>>, Instant) {
        let base = Instant::now();
        let wall = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let anchor = ClockAnchor::new(base, wall);
        (
            ConsoleSink::new(Vec::new(), format, anchor, Duration::from_secs(5)),
            base,
        )
    }

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn text_lines_follow_console_format() {
        let (mut sink, base) = sink(OutputFormat::Text);
        let at = base + Duration::from_millis(1500);
        let (source, group) = (ip("10.0.0.1"), ip("239.0.0.1"));

        sink.notify(Notice::NewSource { source, group, at });
        sink.notify(Notice::MultiSourceWarning { group, at });
        sink.notify(Notice::SourceEvicted { source, group, at });
        sink.notify(Notice::GlobalTimeout { at });

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "12:00:01.500: New source 10.0.0.1 for multicast address 239.0.0.1",
                "12:00:01.500: Warning: Multiple sources transmitting on multicast address 239.0.0.1",
                "12:00:01.500: Removed inactive source 10.0.0.1 for multicast address 239.0.0.1",
                "12:00:01.500: Timeout reached. No packets received within the last 5 seconds.",
            ]
        );
    }

    #[test]
    fn json_lines_carry_kind_and_addresses() {
        let (sink, base) = sink(OutputFormat::Json);
        let notice = Notice::SourceEvicted {
            source: ip("10.0.0.2"),
            group: ip("239.0.0.1"),
            at: base,
        };
        let value: serde_json::Value = serde_json::from_str(&sink.render(&notice).unwrap()).unwrap();
        assert_eq!(value["kind"], "source_evicted");
        assert_eq!(value["source"], "10.0.0.2");
        assert_eq!(value["group"], "239.0.0.1");
        assert!(value.get("timeout_secs").is_none());

        let timeout: serde_json::Value =
            serde_json::from_str(&sink.render(&Notice::GlobalTimeout { at: base }).unwrap()).unwrap();
        assert_eq!(timeout["kind"], "global_timeout");
        assert_eq!(timeout["timeout_secs"], 5);
        assert!(timeout.get("group").is_none());
    }

    #[test]
    fn anchor_maps_instants_before_and_after() {
        let base = Instant::now() + Duration::from_secs(10);
        let wall = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let anchor = ClockAnchor::new(base, wall);
        assert_eq!(
            anchor.wall_time(base + Duration::from_secs(2)),
            wall + TimeDelta::seconds(2)
        );
        assert_eq!(
            anchor.wall_time(base - Duration::from_secs(3)),
            wall - TimeDelta::seconds(3)
        );
    }
}
