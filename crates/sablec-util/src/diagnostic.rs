//! Diagnostic module - Error and warning reporting infrastructure.
//!
//! Diagnostics are reported in place and collected by a [`Handler`]; they
//! never propagate as panics or `Err` values through a pass. A pass that
//! wants to pair a primary error with a companion location (a definition
//! site, a trailing expression) emits a second diagnostic at
//! [`Level::Note`] immediately after the first.
//!
//! # Examples
//!
//! ```
//! use sablec_util::diagnostic::{DiagnosticBuilder, Handler};
//! use sablec_util::span::Span;
//!
//! let handler = Handler::new();
//! DiagnosticBuilder::error("condition must be a Bool")
//!     .span(Span::point(4, 8))
//!     .emit(&handler);
//!
//! assert!(handler.has_errors());
//! ```

use crate::span::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails the pass
    Error,
    /// A warning that doesn't fail the pass
    Warning,
    /// A companion location for the preceding diagnostic
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with severity and location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Diagnostic severity level
    pub level: Level,
    /// Main diagnostic message
    pub message: String,
    /// Source location
    pub span: Span,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Create a note diagnostic.
    pub fn note(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Note, message, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.span.line, self.span.column, self.level, self.message
        )
    }
}

/// Fluent builder for diagnostics.
///
/// # Examples
///
/// ```
/// use sablec_util::diagnostic::{DiagnosticBuilder, Handler};
/// use sablec_util::span::Span;
///
/// let handler = Handler::new();
/// DiagnosticBuilder::error("tuple index is out of bounds")
///     .span(Span::point(2, 14))
///     .emit(&handler);
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
}

impl DiagnosticBuilder {
    /// Start an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span: Span::DUMMY,
        }
    }

    /// Start a note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            level: Level::Note,
            message: message.into(),
            span: Span::DUMMY,
        }
    }

    /// Attach the source location.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Finish the diagnostic without emitting it.
    pub fn build(self) -> Diagnostic {
        Diagnostic::new(self.level, self.message, self.span)
    }

    /// Finish the diagnostic and hand it to `handler`.
    pub fn emit(self, handler: &Handler) {
        handler.emit(self.build());
    }
}

/// Handler for collecting and reporting diagnostics.
///
/// The handler is a push-only sink: passes emit into it and the driver
/// queries the totals afterwards.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Check if any errors have been reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Get the total number of diagnostics, notes included.
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Whether no diagnostics have been recorded at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Get a snapshot of all diagnostics in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Clear all diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}
