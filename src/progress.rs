//! Update progress reporting.
//!
//! Reports what `artsync update` is doing so users can watch a long run.
//! Progress is emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

use article_sync_core::progress::{NoProgress, SyncProgressEvent, SyncProgressReporter};

/// Human-friendly progress on stderr: "update  syncing  1,234 / 5,000 articles".
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, event: SyncProgressEvent) {
        let line = match &event {
            SyncProgressEvent::Loading { dir } => {
                format!("update  loading {}\n", dir.display())
            }
            SyncProgressEvent::Syncing { n, total } => {
                format!(
                    "update  syncing  {} / {} articles\n",
                    format_number(*n),
                    format_number(*total)
                )
            }
            SyncProgressEvent::Reconciled { deleted } => {
                format!("update  removed {} stale articles\n", format_number(*deleted))
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SyncProgressReporter for JsonProgress {
    fn report(&self, event: SyncProgressEvent) {
        let obj = match &event {
            SyncProgressEvent::Loading { dir } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "dir": dir.display().to_string(),
            }),
            SyncProgressEvent::Syncing { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "syncing",
                "n": n,
                "total": total,
            }),
            SyncProgressEvent::Reconciled { deleted } => serde_json::json!({
                "event": "progress",
                "phase": "reconciled",
                "deleted": deleted,
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
