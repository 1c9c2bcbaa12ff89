use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::diagnostics::{ErrorKind, Result, fatal};

pub const DEFAULT_LOG_FILE: &str = "aurora.LOG";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which leveled messages reach the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogLevels {
    pub debug: bool,
    pub verbose: bool,
    pub warning: bool,
}

impl LogLevels {
    /// Debug implies verbose and verbose implies warning, unless `strict`
    /// limits output to exactly the levels asked for.
    pub fn resolve(debug: bool, verbose: bool, warning: bool, strict: bool) -> Self {
        let verbose = verbose || (debug && !strict);
        let warning = warning || (verbose && !strict);
        Self {
            debug,
            verbose,
            warning,
        }
    }

    pub fn allows(&self, level: Level) -> bool {
        match level {
            Level::Error | Level::Warn => self.warning,
            Level::Info | Level::Trace => self.verbose,
            Level::Debug => self.debug,
        }
    }

    fn max_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Trace
        } else if self.debug {
            LevelFilter::Debug
        } else if self.warning {
            LevelFilter::Warn
        } else {
            LevelFilter::Off
        }
    }
}

/// Appends every enabled record to the log file and, unless silenced,
/// echoes it to stderr.
pub struct Logger {
    levels: LogLevels,
    no_console: bool,
    show_timestamp: bool,
    file: Mutex<File>,
}

impl Logger {
    pub fn new(levels: LogLevels, path: &Path, clear: bool, no_console: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(!clear)
            .write(true)
            .truncate(clear)
            .open(path)?;
        Ok(Self {
            levels,
            no_console,
            show_timestamp: false,
            file: Mutex::new(file),
        })
    }

    pub fn with_timestamps(mut self, show_timestamp: bool) -> Self {
        self.show_timestamp = show_timestamp;
        self
    }

    /// Installs the logger as the process-wide `log` sink.
    pub fn install(self) -> Result<()> {
        let max_level = self.levels.max_level();
        log::set_boxed_logger(Box::new(self)).map_err(|err| {
            fatal(
                ErrorKind::System,
                format!("could not install the logger: {err}"),
            )
        })?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with("aurora") && self.levels.allows(metadata.level())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(
            record.level(),
            &record.args().to_string(),
            self.show_timestamp.then(|| Local::now().format(TIMESTAMP_FORMAT).to_string()),
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
        if !self.no_console {
            let _ = writeln!(io::stderr(), "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// `[LEVEL] message`, or `[LEVEL] timestamp: message` when a timestamp is
/// given.
pub fn format_record(level: Level, message: &str, timestamp: Option<String>) -> String {
    match timestamp {
        Some(timestamp) => format!("[{}] {timestamp}: {}", label(level), escape(message)),
        None => format!("[{}] {}", label(level), escape(message)),
    }
}

fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info | Level::Trace => "VERBOSE",
        Level::Debug => "DEBUG",
    }
}

/// Keeps each record on one line.
pub fn escape(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for ch in message.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}
