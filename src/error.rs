use miette::Diagnostic;
use thiserror::Error;

/// Main error type for navgrid operations
#[derive(Error, Diagnostic, Debug)]
pub enum NavError {
    #[error("IO error: {0}")]
    #[diagnostic(code(navgrid::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(navgrid::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Empty input: no parseable rows")]
    #[diagnostic(code(navgrid::empty_input))]
    EmptyInput,

    #[error("Format error: {message}")]
    #[diagnostic(code(navgrid::format))]
    Format {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("No floor images found in {path}")]
    #[diagnostic(code(navgrid::no_floors))]
    NoFloorsFound { path: std::path::PathBuf },

    #[error("Parse error: {message}")]
    #[diagnostic(code(navgrid::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Assembly error: {message}")]
    #[diagnostic(code(navgrid::assembly))]
    Assembly { message: String },
}

pub type Result<T> = std::result::Result<T, NavError>;
