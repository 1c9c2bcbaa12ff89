use std::{collections::HashSet, fs, io, path::Path};

use serde::Deserialize;

use crate::{
    diagnostics::{AuroraError, ErrorKind, ErrorPolicy, Result, fatal},
    runtime::{DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_STRING_LENGTH},
};

pub const DEFAULT_CONFIG_FILE: &str = "auroraConfig.json";

/// User settings read from a JSON object with PascalCase keys. Every key is
/// optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub max_expression_depth: usize,
    /// Byte limit for strings built by `+` and `*`.
    pub max_string_length: usize,
    /// Codes always treated as fatal.
    pub errors: Vec<String>,
    /// Codes dropped without a warning.
    pub ignore: Vec<String>,
    pub clear_log_file: bool,
    pub debug: bool,
    pub verbose: bool,
    pub warning: bool,
    pub no_console: bool,
    /// Prefix each log record with the local time.
    pub show_timestamp: bool,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            errors: Vec::new(),
            ignore: Vec::new(),
            clear_log_file: true,
            debug: false,
            verbose: false,
            warning: false,
            no_console: false,
            show_timestamp: false,
            strict: false,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            fatal(
                ErrorKind::Configuration,
                format!("invalid configuration: {err}"),
            )
        })
    }

    /// Reads `path`. With `required == false` a missing file yields the
    /// defaults instead of an error.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        log::trace!("applying configuration from {}", path.display());
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if required {
                    Err(fatal(
                        ErrorKind::FileNotFound,
                        format!("the configuration file '{}' does not exist", path.display()),
                    ))
                } else {
                    Ok(Self::default())
                }
            }
            Err(err) => Err(AuroraError::from(err)),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        ErrorPolicy {
            strict: self.strict,
            escalate: self.errors.iter().cloned().collect::<HashSet<_>>(),
            ignore: self.ignore.iter().cloned().collect::<HashSet<_>>(),
        }
    }
}
