//! Codec error types.

use thiserror::Error;

/// Component source that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Template that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("component has no template section")]
    MissingTemplate,

    #[error("template is empty")]
    EmptyTemplate,

    #[error("template line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Any failure converting a component between its forms.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Template compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Invalid component data: {0}")]
    Wire(#[from] serde_json::Error),
}
