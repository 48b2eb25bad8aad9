//! Diagnostics (§4.7): three channels — counted syntax errors, fatal
//! semantic errors, and advisory semantic warnings. The original mixes
//! macros that reach into global state (`semantic_error` reads `yylineno`
//! and calls `abort()`, which reopens the output streams in truncate
//! mode); here, semantic-analysis functions return `Result<_, SemanticError>`
//! and the CLI driver owns the truncate-on-abort effect by simply
//! discarding the buffered `.sym`/`.quad` text instead of writing it.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SemanticError {
    #[error("'{name}' has not been declared before")]
    NotDeclared { name: String },
    #[error("'{name}' is a {found}, not a {expected}")]
    KindMismatch { name: String, found: &'static str, expected: &'static str },
    #[error("invalid operands to {op}: {left} and {right}")]
    OperatorTypeMismatch { op: &'static str, left: &'static str, right: &'static str },
    #[error("'{name}' is already declared (previous declaration in L#{prev_line})")]
    AlreadyDeclared { name: String, prev_line: u32 },
    #[error("cannot assign to '{name}': it is declared const")]
    AssignToConst { name: String },
    #[error("'{name}' expects {expected} arguments, but {found} were provided")]
    ArityMismatch { name: String, expected: usize, found: usize },
    #[error("argument {index} of '{name}' expects {expected}, but {found} was provided")]
    ArgTypeMismatch { name: String, index: usize, expected: String, found: String },
    #[error("incompatible for comparison: '{left}' and '{right}' are different enum types")]
    IncompatibleEnumComparison { left: String, right: String },
    #[error("'{variant}' is not a variant of enum '{enum_name}'")]
    UnknownEnumVariant { enum_name: String, variant: String },
    #[error("cannot assign {found} to variable of type {expected}")]
    AssignTypeMismatch { expected: String, found: String },
    #[error("return type mismatch: expected {expected}, found {found}")]
    ReturnTypeMismatch { expected: String, found: String },
    #[error("const declaration requires a constant initializer of type {expected}")]
    NotAConstInitializer { expected: String },
    #[error("{context} requires a compile-time constant expression")]
    NotConstant { context: &'static str },
    #[error("'{name}' is not a declared enum type")]
    UndeclaredEnumType { name: String },
    #[error("case value of type {found} does not match switch expression of type {expected}")]
    CaseTypeMismatch { expected: String, found: String },
}

/// Accumulates warnings and the syntax-error count; owns nothing about
/// output files (the CLI driver does, see `cli`).
#[derive(Default)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub syntax_error_count: u32,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn syntax_error(&mut self, line: u32, text: &str) {
        self.syntax_error_count += 1;
        eprintln!("STX(N#{}): Invalid syntax near '{text}' in L#{line}", self.syntax_error_count);
    }

    pub fn warn(&mut self, line: u32, message: impl Into<String>) {
        let message = message.into();
        eprintln!("SEM-W(L#{line}): {message}");
        self.warnings.push(message);
    }

    /// `SEM-E` is printed by the caller at the point the `Result::Err`
    /// surfaces (see `Compiler`'s public APIs), since that is where the
    /// current line is known; this just renders the fixed prefix.
    pub fn format_error(line: u32, err: &SemanticError) -> String {
        format!("SEM-E(L#{line}): {err}")
    }
}
