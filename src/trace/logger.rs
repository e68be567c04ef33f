use std::{
    fs::OpenOptions,
    io::Write,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::trace::trace::TraceEvent;

pub const DEFAULT_TRACE_PATH: &str = "wizard_trace.jsonl";

enum Sink {
    File(Mutex<std::fs::File>),
    Memory(Mutex<Vec<String>>),
    Disabled,
}

/// Appends `TraceEvent`s as JSON lines. Failures are reported on stderr
/// and never reach the caller.
pub struct TraceLogger {
    sink: Sink,
    seq: AtomicU64,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        let sink = match file {
            Ok(f) => Sink::File(Mutex::new(f)),
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Sink::Disabled
            }
        };
        Self::with_sink(sink)
    }

    /// Keep lines in memory (tests, `check` command).
    pub fn in_memory() -> Self {
        Self::with_sink(Sink::Memory(Mutex::new(Vec::new())))
    }

    pub fn disabled() -> Self {
        Self::with_sink(Sink::Disabled)
    }

    fn with_sink(sink: Sink) -> Self {
        Self {
            sink,
            seq: AtomicU64::new(0),
        }
    }

    pub fn log(&self, mut event: TraceEvent) {
        if matches!(self.sink, Sink::Disabled) {
            return;
        }
        event.seq = self.seq.fetch_add(1, Ordering::Relaxed);

        let json = match serde_json::to_string(&event) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace event: {}", e);
                return;
            }
        };

        match &self.sink {
            Sink::File(file) => match file.lock() {
                Ok(mut f) => {
                    if let Err(e) = writeln!(f, "{}", json) {
                        eprintln!("Warning: failed to write trace event: {}", e);
                    }
                }
                Err(e) => eprintln!("Warning: trace logger lock poisoned: {}", e),
            },
            Sink::Memory(lines) => match lines.lock() {
                Ok(mut l) => l.push(json),
                Err(e) => eprintln!("Warning: trace logger lock poisoned: {}", e),
            },
            Sink::Disabled => {}
        }
    }

    /// Lines captured by an in-memory logger; empty for other sinks.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Memory(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Event names captured by an in-memory logger, in order.
    pub fn event_names(&self) -> Vec<String> {
        self.lines()
            .iter()
            .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
            .filter_map(|v| v["event"].as_str().map(str::to_string))
            .collect()
    }
}
