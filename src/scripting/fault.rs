//! Script faults as host values.
//!
//! Every error raised while compiling or running a script is captured as a
//! [`ScriptFault`]: a category, a message, the best position the engine could
//! report and a list of call frames. Faults never unwind into the host.

use std::fmt;

use rhai::{EvalAltResult, ParseError, Position};
use serde::Serialize;
use thiserror::Error;

/// Classification of a script fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FaultCategory {
    /// Source failed to compile
    Parse,
    /// Script called `throw`, or a host function reported an error
    Runtime,
    /// Unknown variable or property
    Name,
    /// No function matches the call
    Function,
    /// Value has the wrong type for the operation
    Type,
    /// Arithmetic overflow or division by zero
    Arithmetic,
    /// Index or key out of range
    Index,
    /// Attempt to modify a constant
    Constant,
    /// Configured operation, depth or size limit reached
    Limit,
    /// Execution was terminated by the host
    Terminated,
    /// Error from the engine's host environment
    System,
    /// Anything else
    Script,
}

impl FaultCategory {
    /// Script-facing name, e.g. `RuntimeError`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FaultCategory::Parse => "ParseError",
            FaultCategory::Runtime => "RuntimeError",
            FaultCategory::Name => "NameError",
            FaultCategory::Function => "FunctionError",
            FaultCategory::Type => "TypeError",
            FaultCategory::Arithmetic => "ArithmeticError",
            FaultCategory::Index => "IndexError",
            FaultCategory::Constant => "ConstantError",
            FaultCategory::Limit => "LimitError",
            FaultCategory::Terminated => "Terminated",
            FaultCategory::System => "SystemError",
            FaultCategory::Script => "ScriptError",
        }
    }

    fn classify(err: &EvalAltResult) -> Self {
        use EvalAltResult as E;

        match err {
            E::ErrorParsing(..) => FaultCategory::Parse,
            E::ErrorRuntime(..) => FaultCategory::Runtime,
            E::ErrorVariableNotFound(..) | E::ErrorPropertyNotFound(..) => FaultCategory::Name,
            E::ErrorFunctionNotFound(..) | E::ErrorModuleNotFound(..) => FaultCategory::Function,
            E::ErrorMismatchDataType(..)
            | E::ErrorMismatchOutputType(..)
            | E::ErrorIndexingType(..)
            | E::ErrorDotExpr(..) => FaultCategory::Type,
            E::ErrorArithmetic(..) => FaultCategory::Arithmetic,
            E::ErrorArrayBounds(..) | E::ErrorStringBounds(..) | E::ErrorIndexNotFound(..) => {
                FaultCategory::Index
            }
            E::ErrorAssignmentToConstant(..) => FaultCategory::Constant,
            E::ErrorTooManyOperations(..)
            | E::ErrorTooManyModules(..)
            | E::ErrorStackOverflow(..)
            | E::ErrorDataTooLarge(..) => FaultCategory::Limit,
            E::ErrorTerminated(..) => FaultCategory::Terminated,
            E::ErrorSystem(..) => FaultCategory::System,
            _ => FaultCategory::Script,
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Line/column of a fault, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultPosition {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl FaultPosition {
    fn from_rhai(pos: Position) -> Option<Self> {
        let line = pos.line()?;
        Some(Self {
            line,
            column: pos.position().unwrap_or(0),
        })
    }
}

impl fmt::Display for FaultPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, position {}", self.line, self.column)
    }
}

/// A fault raised by script code, carried back to the host as a value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{category}: {message}")]
pub struct ScriptFault {
    /// Kind of fault.
    pub category: FaultCategory,
    /// Message without position or trace.
    pub message: String,
    /// File or label the failing source came from
    pub source_name: Option<String>,
    /// Where the fault was raised, when known.
    pub position: Option<FaultPosition>,
    /// Frames, outermost call first, ending at the origin of the fault
    pub trace: Vec<String>,
}

impl ScriptFault {
    /// Build a fault without engine context.
    pub fn new(category: FaultCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            source_name: None,
            position: None,
            trace: Vec::new(),
        }
    }

    /// Capture an engine error, unwrapping nested function and module frames.
    #[allow(clippy::boxed_local)] // Box is how Rhai returns errors
    pub fn from_eval(err: Box<EvalAltResult>, source_name: Option<&str>) -> Self {
        let mut trace = Vec::new();
        let mut current = *err;

        let mut origin = loop {
            current = match current {
                EvalAltResult::ErrorInFunctionCall(name, src, inner, pos) => {
                    let src = if src.is_empty() {
                        source_name.map(str::to_string)
                    } else {
                        Some(src)
                    };
                    trace.push(frame(&format!("in call to function '{name}'"), src.as_deref(), pos));
                    *inner
                }
                EvalAltResult::ErrorInModule(name, inner, pos) => {
                    trace.push(frame(&format!("in module '{name}'"), source_name, pos));
                    *inner
                }
                other => break other,
            };
        };

        let pos = origin.take_position();
        let category = FaultCategory::classify(&origin);
        let message = match origin {
            EvalAltResult::ErrorRuntime(value, _) => value.to_string(),
            EvalAltResult::ErrorTerminated(token, _) if !token.is_unit() => token.to_string(),
            EvalAltResult::ErrorParsing(kind, _) => kind.to_string(),
            other => other.to_string(),
        };

        trace.push(frame("at", source_name, pos));

        Self {
            category,
            message,
            source_name: source_name.map(str::to_string),
            position: FaultPosition::from_rhai(pos),
            trace,
        }
    }

    /// Capture a compilation error.
    pub fn from_parse(err: ParseError, source_name: Option<&str>) -> Self {
        let err: Box<EvalAltResult> = err.into();
        Self::from_eval(err, source_name)
    }

    /// The category name, e.g. `RuntimeError`.
    #[must_use]
    pub fn category_name(&self) -> &'static str {
        self.category.name()
    }

    /// The trace as indented lines, or `None` when no frame was recorded.
    #[must_use]
    pub fn formatted_trace(&self) -> Option<String> {
        if self.trace.is_empty() {
            return None;
        }
        Some(
            self.trace
                .iter()
                .map(|f| format!("  {f}"))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// `Category: message` followed by the trace.
    #[must_use]
    pub fn render(&self) -> String {
        match self.formatted_trace() {
            Some(trace) => format!("{}: {}\n{}", self.category, self.message, trace),
            None => format!("{}: {}", self.category, self.message),
        }
    }
}

fn frame(what: &str, source: Option<&str>, pos: Position) -> String {
    match (source, FaultPosition::from_rhai(pos)) {
        (Some(src), Some(p)) => format!("{what} {src}, {p}"),
        (Some(src), None) => format!("{what} {src}"),
        (None, Some(p)) => format!("{what} {p}"),
        (None, None) => format!("{what} <unknown>"),
    }
}

/// Log a fault with its trace.
pub fn dump_fault(fault: &ScriptFault) {
    tracing::error!(
        category = fault.category_name(),
        source = fault.source_name.as_deref().unwrap_or("<source>"),
        "{}",
        fault.render()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Engine;

    fn fault_of(script: &str) -> ScriptFault {
        let engine = Engine::new();
        let err = engine.eval::<rhai::Dynamic>(script).unwrap_err();
        ScriptFault::from_eval(err, Some("test.rhai"))
    }

    #[test]
    fn thrown_value_becomes_message() {
        let fault = fault_of(r#"throw "placement failed""#);
        assert_eq!(fault.category, FaultCategory::Runtime);
        assert_eq!(fault.message, "placement failed");
        assert_eq!(fault.position.map(|p| p.line), Some(1));
    }

    #[test]
    fn nested_calls_produce_frames() {
        let fault = fault_of(
            r#"
            fn inner() { throw "deep"; }
            fn outer() { inner() }
            outer()
            "#,
        );
        assert_eq!(fault.message, "deep");
        assert_eq!(fault.trace.len(), 3);
        assert!(fault.trace[0].contains("'outer'"));
        assert!(fault.trace[1].contains("'inner'"));
        assert!(fault.trace[2].starts_with("at test.rhai"));
    }

    #[test]
    fn unknown_variable_is_a_name_error() {
        let fault = fault_of("missing_thing + 1");
        assert_eq!(fault.category, FaultCategory::Name);
        assert!(fault.message.contains("missing_thing"));
    }

    #[test]
    fn parse_errors_are_categorized() {
        let engine = Engine::new();
        let err = engine.compile("let = ;").unwrap_err();
        let fault = ScriptFault::from_parse(err, None);
        assert_eq!(fault.category_name(), "ParseError");
        assert!(!fault.message.is_empty());
    }

    #[test]
    fn render_starts_with_category() {
        let fault = fault_of("let zero = 0; 1 / zero");
        assert_eq!(fault.category, FaultCategory::Arithmetic);
        let rendered = fault.render();
        assert!(rendered.starts_with("ArithmeticError: "));
        assert!(rendered.contains("\n  at test.rhai"));
    }

    #[test]
    fn fault_without_frames_renders_one_line() {
        let fault = ScriptFault::new(FaultCategory::System, "engine gone");
        assert_eq!(fault.render(), "SystemError: engine gone");
        assert!(fault.formatted_trace().is_none());
    }
}
