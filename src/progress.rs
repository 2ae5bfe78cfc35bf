//! Crawl progress reporting.
//!
//! Reports observable progress during `docrawl crawl` so users see what
//! is being discovered, which archive is being unpacked, and which file
//! is being extracted. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// A single progress event for a crawl.
#[derive(Clone, Debug)]
pub enum CrawlProgressEvent {
    /// A regular file was discovered during the walk.
    Found { name: String },
    /// A leaf document is being processed into a record.
    Processing { name: String },
    /// An archive is being unpacked; `chain` is its full provenance path.
    Extracting { chain: String },
}

/// Reports crawl progress. Implementations write to stderr (human or JSON).
pub trait CrawlProgressReporter {
    fn report(&self, event: CrawlProgressEvent);
}

/// Human-friendly progress on stderr, one line per event.
pub struct StderrProgress;

impl CrawlProgressReporter for StderrProgress {
    fn report(&self, event: CrawlProgressEvent) {
        let line = match &event {
            CrawlProgressEvent::Found { name } => format!("Found: {}\n", name),
            CrawlProgressEvent::Processing { name } => format!("  Processing: {}\n", name),
            CrawlProgressEvent::Extracting { chain } => format!("  Extracting: {}\n", chain),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl CrawlProgressReporter for JsonProgress {
    fn report(&self, event: CrawlProgressEvent) {
        let obj = match &event {
            CrawlProgressEvent::Found { name } => serde_json::json!({
                "event": "progress",
                "phase": "found",
                "file": name
            }),
            CrawlProgressEvent::Processing { name } => serde_json::json!({
                "event": "progress",
                "phase": "processing",
                "file": name
            }),
            CrawlProgressEvent::Extracting { chain } => serde_json::json!({
                "event": "progress",
                "phase": "extracting",
                "archive": chain
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl CrawlProgressReporter for NoProgress {
    fn report(&self, _event: CrawlProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
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

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    /// Build a reporter for this mode. Caller passes it to the crawl.
    pub fn reporter(&self) -> Box<dyn CrawlProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
