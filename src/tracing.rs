//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! selection, composition and touch-tracking transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=selection=debug,message=debug` - scoped filtering
//! - `RUST_LOG=richedit::update=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/richedit/logs/richedit.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use std::ops::Range;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::{TextView, TrackingMode};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var and defaults to `warn`.
/// File logging writes to `~/.config/richedit/logs/richedit.log` with daily
/// rotation unless `file_logging` is false.
pub fn init(file_logging: bool) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer on stderr so stdout stays machine readable
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = if file_logging {
        match crate::config_paths::ensure_logs_dir() {
            Ok(logs_dir) => {
                let file_appender = tracing_appender::rolling::daily(logs_dir, "richedit.log");
                Some(
                    fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true)
                        .with_filter(EnvFilter::new("debug")),
                )
            }
            Err(e) => {
                eprintln!("Warning: Could not initialize file logging: {}", e);
                None
            }
        }
    } else {
        None
    };

    // A second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of selection state for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub len: usize,
    pub selected: Range<usize>,
    pub marked: Option<Range<usize>>,
    pub tracking: TrackingMode,
    pub first_responder: bool,
    pub delete_confirm: bool,
}

impl SelectionSnapshot {
    pub fn from_view(view: &TextView) -> Self {
        Self {
            len: view.inner_text.len(),
            selected: view.selection.selected.as_range(),
            marked: view.selection.marked.map(|m| m.as_range()),
            tracking: view.tracking_mode(),
            first_responder: view.flags.first_responder,
            delete_confirm: view.flags.delete_confirm,
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.len != other.len {
            changes.push(format!("len: {} → {}", self.len, other.len));
        }
        if self.selected != other.selected {
            changes.push(format!(
                "selected: {:?} → {:?}",
                self.selected, other.selected
            ));
        }
        if self.marked != other.marked {
            changes.push(format!("marked: {:?} → {:?}", self.marked, other.marked));
        }
        if self.tracking != other.tracking {
            changes.push(format!(
                "tracking: {:?} → {:?}",
                self.tracking, other.tracking
            ));
        }
        if self.first_responder != other.first_responder {
            let status = if other.first_responder {
                "gained"
            } else {
                "lost"
            };
            changes.push(format!("focus {}", status));
        }
        if self.delete_confirm != other.delete_confirm {
            changes.push(format!("delete confirm: {}", other.delete_confirm));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(selected: Range<usize>) -> SelectionSnapshot {
        SelectionSnapshot {
            len: 5,
            selected,
            marked: None,
            tracking: TrackingMode::Inactive,
            first_responder: false,
            delete_confirm: false,
        }
    }

    #[test]
    fn test_identical_snapshots_have_no_diff() {
        assert_eq!(snapshot(0..0).diff(&snapshot(0..0)), None);
    }

    #[test]
    fn test_diff_lists_changes() {
        let before = snapshot(0..0);
        let mut after = snapshot(1..1);
        after.marked = Some(0..1);
        after.first_responder = true;
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("selected: 0..0 → 1..1"));
        assert!(diff.contains("marked"));
        assert!(diff.contains("focus gained"));
    }
}
