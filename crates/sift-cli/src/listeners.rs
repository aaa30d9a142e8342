//! Event listeners attached for the duration of a command.
//!
//! Displayed events go to stderr so formatted results on stdout stay parseable.

use crate::console::Console;
use chrono::{Local, SecondsFormat, Utc};
use parking_lot::Mutex;
use sift_core::{Event, EventLevel, EventListener};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shows `Info` and above on the console's stderr channels.
pub struct EventDisplayer {
    console: Arc<dyn Console>,
}

impl EventDisplayer {
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self { console }
    }
}

/// `source [HH:MM:SS.mmm]:` then the message indented by four spaces.
pub fn display_line(event: &Event) -> String {
    let time = event.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f");
    let body: Vec<String> = event
        .message
        .lines()
        .map(|line| format!("    {}", line))
        .collect();
    format!("{} [{}]:\n{}", event.source, time, body.join("\n"))
}

impl EventListener for EventDisplayer {
    fn on_event(&self, event: &Event) {
        match event.level {
            EventLevel::Debug => {}
            EventLevel::Info => self.console.notice(&display_line(event)),
            EventLevel::Warning => self.console.warn(&display_line(event)),
            EventLevel::Error => self.console.error(&display_line(event)),
        }
    }
}

/// Appends every event to a per-invocation log file.
pub struct EventLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventLogger {
    /// Create `sift-<timestamp>.log` under `log_dir`.
    pub fn create(log_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S%.3f");
        let path = log_dir.join(format!("sift-{}.log", stamp));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventListener for EventLogger {
    fn on_event(&self, event: &Event) {
        let line = format!(
            "[{}] {} {} - {}\n",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            event.level.label(),
            event.source,
            event.message
        );
        let mut file = self.file.lock();
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!("Failed to write log file {}: {}", self.path.display(), e);
        }
    }
}
