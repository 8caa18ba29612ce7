//! Per-merge logger with file and callback output.
//!
//! Each merge gets its own logger that:
//! - Writes to a dedicated log file
//! - Sends messages to a callback (if provided)
//! - Keeps per-entry detail out of the output in compact mode
//! - Maintains a tail buffer dumped when a merge aborts

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// File writer and recent detail lines, locked together.
struct Sink {
    writer: Option<BufWriter<File>>,
    tail: VecDeque<String>,
}

/// Per-merge logger with dual output (file + callback).
pub struct MergeLogger {
    log_path: PathBuf,
    config: LogConfig,
    callback: Option<LogCallback>,
    sink: Mutex<Sink>,
}

impl MergeLogger {
    /// Create a logger writing `<log_dir>/<merge_name>.log`.
    pub fn new(
        merge_name: &str,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(merge_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            log_path,
            callback,
            sink: Mutex::new(Sink {
                writer: Some(BufWriter::new(file)),
                tail: VecDeque::with_capacity(config.error_tail),
            }),
            config,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, MessagePrefix::None, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, MessagePrefix::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, MessagePrefix::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, MessagePrefix::Error, message);
    }

    /// `=== name ===` marker opening a merge phase.
    pub fn phase(&self, phase_name: &str) {
        self.emit(LogLevel::Info, MessagePrefix::Phase, phase_name);
    }

    pub fn success(&self, message: &str) {
        self.emit(LogLevel::Info, MessagePrefix::Success, message);
    }

    /// Log a detail line (one reseed, one converted entry count, ...).
    ///
    /// Always kept in the tail buffer; only written out when not compact.
    pub fn detail(&self, line: &str) {
        let limit = self.config.error_tail;
        if limit > 0 {
            let mut sink = self.sink.lock();
            if sink.tail.len() >= limit {
                sink.tail.pop_front();
            }
            sink.tail.push_back(line.to_string());
        }

        if !self.config.compact {
            self.output(&format!("  {}", line));
        }
    }

    /// Write out the buffered detail lines under a `[header/tail]` line.
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.sink.lock().tail.iter().cloned().collect();
        if lines.is_empty() {
            return;
        }

        self.output(&format!("[{}/tail]", header));
        for line in &lines {
            self.output(line);
        }
    }

    /// Buffered detail lines, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.sink.lock().tail.iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(writer) = self.sink.lock().writer.as_mut() {
            let _ = writer.flush();
        }
    }

    fn emit(&self, level: LogLevel, prefix: MessagePrefix, message: &str) {
        if level >= self.config.level {
            self.output(&prefix.format(message));
        }
    }

    fn output(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(writer) = self.sink.lock().writer.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(callback) = &self.callback {
            callback(&line);
        }
    }
}

impl Drop for MergeLogger {
    fn drop(&mut self) {
        self.flush();
        self.sink.get_mut().writer = None;
    }
}

/// Replace characters that are not allowed in file names.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
