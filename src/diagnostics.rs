use std::{collections::HashSet, fmt};

use thiserror::Error;

/// Every error the interpreter can report, with its stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ArgumentSurplus,
    ArgumentDeficit,
    TypeMismatch,
    VarNotDefined,
    ImmutableVarModification,
    UnsupportedOperation,
    OutOfRange,
    DivisionByZero,
    UnexpectedToken,
    InvalidSyntax,
    UnclosedDelimiter,
    ModuleNotFound,
    InvalidMethod,
    InvalidAttribute,
    FileNotFound,
    Configuration,
    ExpressionDepthExceeded,
    System,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::ArgumentSurplus => "Aurora.ArgSurplus",
            Self::ArgumentDeficit => "Aurora.ArgDeficit",
            Self::TypeMismatch => "Aurora.TypeMismatch",
            Self::VarNotDefined => "Aurora.VarNotDefined",
            Self::ImmutableVarModification => "Aurora.ImmutableVarModification",
            Self::UnsupportedOperation => "Aurora.UnsupportedOperation",
            Self::OutOfRange => "Aurora.OutOfRange",
            Self::DivisionByZero => "Aurora.DivisionByZero",
            Self::UnexpectedToken => "Aurora.UnexpectedToken",
            Self::InvalidSyntax => "Aurora.InvalidSyntax",
            Self::UnclosedDelimiter => "Aurora.UnclosedDelimiter",
            Self::ModuleNotFound => "Aurora.ModuleNotFound",
            Self::InvalidMethod => "Aurora.InvalidMethod",
            Self::InvalidAttribute => "Aurora.InvalidAttribute",
            Self::FileNotFound => "Aurora.FileNotFound",
            Self::Configuration => "Aurora.Configuration",
            Self::ExpressionDepthExceeded => "Aurora.ExpressionDepthExceeded",
            Self::System => "Aurora.System",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::ArgumentSurplus => "Argument Surplus",
            Self::ArgumentDeficit => "Argument Deficit",
            Self::TypeMismatch => "Type Mismatch",
            Self::VarNotDefined => "Variable Not Defined",
            Self::ImmutableVarModification => "Immutable Variable Modification",
            Self::UnsupportedOperation => "Unsupported Operation",
            Self::OutOfRange => "Out of Range",
            Self::DivisionByZero => "Division by Zero",
            Self::UnexpectedToken => "Unexpected Token",
            Self::InvalidSyntax => "Invalid Syntax",
            Self::UnclosedDelimiter => "Unclosed Delimiter",
            Self::ModuleNotFound => "Module Not Found",
            Self::InvalidMethod => "Invalid Method",
            Self::InvalidAttribute => "Invalid Attribute",
            Self::FileNotFound => "File Not Found",
            Self::Configuration => "Configuration Error",
            Self::ExpressionDepthExceeded => "Max Expression Depth Exceeded",
            Self::System => "System Error",
        }
    }

    /// Message used when a diagnostic is raised without one of its own.
    pub const fn description(self) -> &'static str {
        match self {
            Self::ArgumentSurplus => "Too many arguments were given to this method or operation",
            Self::ArgumentDeficit => "Not enough arguments were given to this method or operation",
            Self::TypeMismatch => "Operation cannot be performed due to incompatible data types",
            Self::VarNotDefined => "Attempted to access a variable that has not been defined",
            Self::ImmutableVarModification => "Attempted to modify a system-defined variable",
            Self::UnsupportedOperation => "The operation is not supported for these values",
            Self::OutOfRange => "A value is outside the allowed range",
            Self::DivisionByZero => "Attempted to divide by zero",
            Self::UnexpectedToken => "An unexpected token was encountered during parsing",
            Self::InvalidSyntax => "The syntax of this statement is invalid",
            Self::UnclosedDelimiter => "A delimiter (e.g. parenthesis, quote) was not closed",
            Self::ModuleNotFound => "The specified class could not be found",
            Self::InvalidMethod => "The provided method could not be found",
            Self::InvalidAttribute => "The provided attribute could not be found",
            Self::FileNotFound => "The specified file could not be found",
            Self::Configuration => "A problem occurred while loading the configuration",
            Self::ExpressionDepthExceeded => "Too many nested expressions on a single line",
            Self::System => "The system encountered a problem it could not handle",
        }
    }

    /// Always-fatal kinds ignore the error policy entirely.
    pub const fn always_fatal(self) -> bool {
        !matches!(
            self,
            Self::ArgumentSurplus | Self::TypeMismatch | Self::VarNotDefined
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rich diagnostic information surfaced to end users.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            message: if message.is_empty() {
                kind.description().to_string()
            } else {
                message
            },
            line: None,
            notes: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{{Line {line}}} ")?,
            None => write!(f, "{{Unknown line}} ")?,
        }
        write!(
            f,
            "({}) {} - {}",
            self.kind.code(),
            self.kind.title(),
            self.message
        )?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Unified error type for the Aurora interpreter.
#[derive(Debug, Error)]
pub enum AuroraError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuroraError {
    /// Kind of the underlying diagnostic, if this error carries one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Diagnostic(diag) => Some(diag.kind),
            Self::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuroraError>;

/// What happened to a raised diagnostic once the policy looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Fatal,
    Warning,
    Ignored,
}

/// Decides whether a configurable diagnostic aborts the run or is only
/// reported.
#[derive(Debug, Clone, Default)]
pub struct ErrorPolicy {
    pub strict: bool,
    pub escalate: HashSet<String>,
    pub ignore: HashSet<String>,
}

impl ErrorPolicy {
    pub fn disposition(&self, kind: ErrorKind) -> Disposition {
        if kind.always_fatal() || self.strict || self.escalate.contains(kind.code()) {
            Disposition::Fatal
        } else if self.ignore.contains(kind.code()) {
            Disposition::Ignored
        } else {
            Disposition::Warning
        }
    }

    /// Returns `Err` for fatal diagnostics and logs the rest.
    pub fn raise(&self, diag: Diagnostic) -> Result<()> {
        match self.disposition(diag.kind) {
            Disposition::Fatal => Err(AuroraError::from(diag)),
            Disposition::Warning => {
                log::warn!("{diag}");
                Ok(())
            }
            Disposition::Ignored => {
                log::debug!("ignored {diag}");
                Ok(())
            }
        }
    }
}

/// Shorthand for building a fatal error in `?` position.
pub fn fatal(kind: ErrorKind, message: impl Into<String>) -> AuroraError {
    AuroraError::from(Diagnostic::new(kind, message))
}
