//! Reportable anomalies that are recovered locally.
//!
//! Nothing in this crate logs anomalies through a global logger. Instead, the
//! [Client](crate::Client) holds a [Diagnostics] capability and hands it down
//! to the decoder and the assembler, so a host (or a test) decides where the
//! diagnostics go.

use crate::ResultType;
use serde_json::Value;
use std::{fmt, sync::Mutex};
use tracing::Level;

/// Something went wrong, but we kept going.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// No endpoint mapping was configured, so the default endpoints are used.
    DefaultEndpoints,

    /// A result type other than `results` was requested.
    UnsupportedResultType(ResultType),

    /// The response body could not be parsed as a JSON object, even after
    /// repair. It is treated as an empty response.
    DecodeFailed {
        /// The parser's message.
        message: String,
    },

    /// An entry of `Items` is not a JSON object.
    InvalidRecord(Value),

    /// A record's `id` is missing or is not a UUID.
    InvalidId {
        /// The offending id, or [Value::Null] if there wasn't one.
        id: Value,
    },

    /// A record's `coordinates` could not be turned into a polygon.
    InvalidCoordinates {
        /// The record id.
        id: String,

        /// Why the coordinates were rejected.
        message: String,
    },

    /// A record has no geometry.
    MissingGeometry {
        /// The record id.
        id: String,
    },
}

/// Receives [Diagnostic]s.
pub trait Diagnostics: Send + Sync {
    /// Emits a diagnostic.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to [tracing] at their [Diagnostic::level].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

/// Keeps every diagnostic in memory.
///
/// # Examples
///
/// ```
/// use geocore::{Diagnostic, Diagnostics, RecordingDiagnostics};
///
/// let recorder = RecordingDiagnostics::new();
/// recorder.emit(Diagnostic::DefaultEndpoints);
/// assert_eq!(recorder.diagnostics(), vec![Diagnostic::DefaultEndpoints]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingDiagnostics(Mutex<Vec<Diagnostic>>);

impl Diagnostic {
    /// Returns the severity of this diagnostic.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::Diagnostic;
    /// use tracing::Level;
    ///
    /// let diagnostic = Diagnostic::DecodeFailed { message: "oops".to_string() };
    /// assert_eq!(diagnostic.level(), Level::ERROR);
    /// ```
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::DecodeFailed { .. } => Level::ERROR,
            Diagnostic::MissingGeometry { .. } => Level::DEBUG,
            Diagnostic::DefaultEndpoints
            | Diagnostic::UnsupportedResultType(_)
            | Diagnostic::InvalidRecord(_)
            | Diagnostic::InvalidId { .. }
            | Diagnostic::InvalidCoordinates { .. } => Level::WARN,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DefaultEndpoints => {
                write!(f, "no endpoint mapping found: using defaults")
            }
            Diagnostic::UnsupportedResultType(result_type) => {
                write!(
                    f,
                    "unsupported resulttype {result_type}: defaulting to \"results\""
                )
            }
            Diagnostic::DecodeFailed { message } => {
                write!(f, "failed to parse JSON response: {message}")
            }
            Diagnostic::InvalidRecord(value) => {
                write!(f, "skipped record that is not an object: {value}")
            }
            Diagnostic::InvalidId { id } => write!(f, "skipped record with ID {id}: not a UUID"),
            Diagnostic::InvalidCoordinates { id, message } => {
                write!(f, "failed to parse coords of record {id}: {message}")
            }
            Diagnostic::MissingGeometry { id } => write!(f, "record {id} has no geometry"),
        }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.level() {
            Level::ERROR => tracing::error!("{diagnostic}"),
            Level::WARN => tracing::warn!("{diagnostic}"),
            Level::INFO => tracing::info!("{diagnostic}"),
            Level::DEBUG => tracing::debug!("{diagnostic}"),
            Level::TRACE => tracing::trace!("{diagnostic}"),
        }
    }
}

impl RecordingDiagnostics {
    /// Creates a new, empty recorder.
    pub fn new() -> RecordingDiagnostics {
        RecordingDiagnostics::default()
    }

    /// Returns a copy of everything emitted so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.0
            .lock()
            .map(|diagnostics| diagnostics.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.0.lock() {
            Ok(mut diagnostics) => diagnostics.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
