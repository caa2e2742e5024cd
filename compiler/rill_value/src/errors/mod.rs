//! Error types for the runtime core.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries typed data for each failure so callers can match
//! on the kind instead of parsing messages. `EvalErrorKind::category()` maps
//! every kind onto the user-visible taxonomy (`ArityError`, `TypeError`,
//! `NameError`, ...). Factory functions (e.g. `wrong_arg_count()`) are the
//! public construction API; they populate both `kind` and `message`.
//!
//! # Control Flow
//!
//! Interpreted bodies unwind with `ControlAction`: either a `return` carrying
//! a value or an `EvalError`. Script-level `throw` is an `EvalError` of kind
//! `Exception` whose thrown value rides along in `EvalError::thrown`.

use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Signal raised by a block while it executes.
///
/// `Return` is consumed by the invocation that owns the block; `Error`
/// unwinds to the original call site unchanged.
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// `return value` inside an interpreted body.
    Return(Value),
    /// A failure, including a script exception.
    Error(EvalError),
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(err)
    }
}

/// User-visible error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ArityError,
    TypeError,
    NameError,
    PackageNotFoundError,
    UnsupportedSignalError,
    RecursionError,
    Exception,
}

impl ErrorCategory {
    /// Name shown in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::ArityError => "ArityError",
            ErrorCategory::TypeError => "TypeError",
            ErrorCategory::NameError => "NameError",
            ErrorCategory::PackageNotFoundError => "PackageNotFoundError",
            ErrorCategory::UnsupportedSignalError => "UnsupportedSignalError",
            ErrorCategory::RecursionError => "RecursionError",
            ErrorCategory::Exception => "Exception",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed error category for structured diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Function
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        /// Whether `expected` is a lower bound (rest parameter present).
        at_least: bool,
    },
    NotCallable {
        type_name: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Type
    TypeMismatch {
        operation: String,
        expected: String,
        got: String,
    },
    InvalidOperation {
        message: String,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    UndefinedMethod {
        method: String,
        type_name: String,
    },
    PackageNotFound {
        name: String,
    },
    PackageInitializing {
        name: String,
    },
    UnsupportedSignal {
        name: String,
    },

    /// A value thrown by interpreted code.
    Exception,
}

impl EvalErrorKind {
    /// The taxonomy bucket this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArityMismatch { .. } => ErrorCategory::ArityError,
            Self::NotCallable { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidOperation { .. } => ErrorCategory::TypeError,
            Self::UndefinedVariable { .. }
            | Self::UndefinedMethod { .. }
            | Self::PackageInitializing { .. } => ErrorCategory::NameError,
            Self::PackageNotFound { .. } => ErrorCategory::PackageNotFoundError,
            Self::UnsupportedSignal { .. } => ErrorCategory::UnsupportedSignalError,
            Self::StackOverflow { .. } => ErrorCategory::RecursionError,
            Self::Exception => ErrorCategory::Exception,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                name,
                expected,
                got,
                at_least,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                let bound = if *at_least { "at least " } else { "" };
                if name.is_empty() {
                    write!(f, "expected {bound}{expected} {arg_word}, got {got}")
                } else {
                    write!(f, "{name} expects {bound}{expected} {arg_word}, got {got}")
                }
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
            Self::TypeMismatch {
                operation,
                expected,
                got,
            } => write!(f, "{operation} expects {expected}, got {got}"),
            Self::InvalidOperation { message } => f.write_str(message),
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedMethod { method, type_name } => {
                write!(f, "no method '{method}' on {type_name}")
            }
            Self::PackageNotFound { name } => write!(f, "package not found: {name}"),
            Self::PackageInitializing { name } => {
                write!(f, "package '{name}' is still initializing")
            }
            Self::UnsupportedSignal { name } => write!(f, "unsupported signal: {name}"),
            Self::Exception => write!(f, "uncaught exception"),
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function or method name.
    pub name: String,
}

/// Immutable snapshot of the call stack at an error site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    /// Create a backtrace from a list of frames (most recent first).
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "call backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {}", frame.name)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message.
    ///
    /// For factory-created errors this equals `kind.to_string()`; for
    /// exceptions it is the thrown value's string form.
    pub message: String,
    /// The value thrown by script code, for `Exception` errors.
    pub thrown: Option<Value>,
    /// Call stack backtrace at the error site.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            thrown: None,
            backtrace: None,
        }
    }

    /// Wrap a script value thrown by interpreted code.
    pub fn exception(value: Value) -> Self {
        Self {
            kind: EvalErrorKind::Exception,
            message: value.to_string(),
            thrown: Some(value),
            backtrace: None,
        }
    }

    /// Attach a backtrace to this error.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// The taxonomy bucket of this error.
    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.message)
    }
}

impl std::error::Error for EvalError {}

// Function Errors

/// Wrong argument count for a named callable.
#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
        at_least: false,
    })
}

/// Too few arguments for a callable with a rest parameter.
#[cold]
pub fn too_few_args(name: &str, minimum: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected: minimum,
        got,
        at_least: true,
    })
}

/// Value is not callable.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

/// Maximum call depth exceeded.
#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth: limit })
}

// Type Errors

/// Wrong value kind at a native operation boundary.
#[cold]
pub fn type_mismatch(operation: &str, expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        operation: operation.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

/// Operation not valid in the current state.
#[cold]
pub fn invalid_operation(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperation {
        message: message.into(),
    })
}

// Access Errors

/// Undefined variable.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// No such method on a receiver.
#[cold]
pub fn no_such_method(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMethod {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

/// No initializer registered under a package name.
#[cold]
pub fn package_not_found(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PackageNotFound {
        name: name.to_string(),
    })
}

/// A package requested itself during its own initialization.
#[cold]
pub fn package_initializing(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PackageInitializing {
        name: name.to_string(),
    })
}

/// Signal name outside the supported set.
#[cold]
pub fn unsupported_signal(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedSignal {
        name: name.to_string(),
    })
}
