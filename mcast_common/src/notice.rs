//! Notices raised by the engine and the formats they can be rendered in.
//!
//! Notices carry a monotonic `Instant`; turning it into a wall-clock time is left to
//! whichever sink displays them.
use std::net::IpAddr;
use std::time::Instant;

use clap::ValueEnum;
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Something an alert sink should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// An accepted packet attributed to `source` sending to `group`.
    NewSource {
        /// Sender address.
        source: IpAddr,
        /// Multicast destination.
        group: IpAddr,
        /// When the packet was observed.
        at: Instant,
    },
    /// `group` currently has more than one active source.
    MultiSourceWarning {
        /// Multicast destination.
        group: IpAddr,
        /// When the condition was detected.
        at: Instant,
    },
    /// `source` was removed from `group` after staying silent longer than the timeout.
    SourceEvicted {
        /// Removed sender address.
        source: IpAddr,
        /// Multicast destination.
        group: IpAddr,
        /// When the eviction happened.
        at: Instant,
    },
    /// No traffic at all was observed for longer than the timeout.
    GlobalTimeout {
        /// When the silence was detected.
        at: Instant,
    },
}

impl Notice {
    /// Discriminant of this notice.
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::NewSource { .. } => NoticeKind::NewSource,
            Notice::MultiSourceWarning { .. } => NoticeKind::MultiSourceWarning,
            Notice::SourceEvicted { .. } => NoticeKind::SourceEvicted,
            Notice::GlobalTimeout { .. } => NoticeKind::GlobalTimeout,
        }
    }

    /// Time the notice refers to.
    pub fn at(&self) -> Instant {
        match *self {
            Notice::NewSource { at, .. }
            | Notice::MultiSourceWarning { at, .. }
            | Notice::SourceEvicted { at, .. }
            | Notice::GlobalTimeout { at } => at,
        }
    }

    /// Source address, for notices that concern a single sender.
    pub fn source(&self) -> Option<IpAddr> {
        match *self {
            Notice::NewSource { source, .. } | Notice::SourceEvicted { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Group address, for notices that concern a single group.
    pub fn group(&self) -> Option<IpAddr> {
        match *self {
            Notice::NewSource { group, .. }
            | Notice::MultiSourceWarning { group, .. }
            | Notice::SourceEvicted { group, .. } => Some(group),
            Notice::GlobalTimeout { .. } => None,
        }
    }
}

/// Notice discriminant, used for structured output and filtering.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NoticeKind {
    NewSource,
    MultiSourceWarning,
    SourceEvicted,
    GlobalTimeout,
}

/// How notices are written to the console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[clap(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// One human-readable, timestamped line per notice.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn accessors_follow_variant_fields() {
        let at = Instant::now();
        let source: IpAddr = "10.0.0.1".parse().unwrap();
        let group: IpAddr = "239.0.0.1".parse().unwrap();

        let evicted = Notice::SourceEvicted { source, group, at };
        assert_eq!(evicted.kind(), NoticeKind::SourceEvicted);
        assert_eq!(evicted.source(), Some(source));
        assert_eq!(evicted.group(), Some(group));
        assert_eq!(evicted.at(), at);

        let warning = Notice::MultiSourceWarning { group, at };
        assert_eq!(warning.source(), None);
        assert_eq!(warning.group(), Some(group));

        let timeout = Notice::GlobalTimeout { at };
        assert_eq!(timeout.group(), None);
    }

    #[test]
    fn kinds_render_as_snake_case() {
        assert_eq!(NoticeKind::MultiSourceWarning.to_string(), "multi_source_warning");
        assert_eq!(
            NoticeKind::from_str("GLOBAL_TIMEOUT").unwrap(),
            NoticeKind::GlobalTimeout
        );
        assert_eq!(
            serde_json::to_string(&NoticeKind::SourceEvicted).unwrap(),
            "\"source_evicted\""
        );
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!(<OutputFormat as FromStr>::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::default().to_string(), "text");
    }
}
