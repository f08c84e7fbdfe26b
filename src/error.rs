use miette::Diagnostic;
use thiserror::Error;

/// Main error type for iconcss operations
#[derive(Error, Diagnostic, Debug)]
pub enum IconError {
    #[error("IO error: {0}")]
    #[diagnostic(code(iconcss::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(iconcss::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(iconcss::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(iconcss::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Error in template: {message}")]
    #[diagnostic(code(iconcss::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Codepoint {code_point} for \"{file_name}\" is already assigned to \"{claimed_by}\"")]
    #[diagnostic(
        code(iconcss::collision),
        help("Give each icon its own entry in fixedCodepoints or the glyph map")
    )]
    Collision {
        code_point: String,
        file_name: String,
        claimed_by: String,
    },

    #[error("Upstream error: {message}")]
    #[diagnostic(code(iconcss::upstream))]
    Upstream { message: String },
}

impl IconError {
    /// Shorthand for a configuration error with an optional hint.
    pub fn config(message: impl Into<String>, help: Option<&str>) -> Self {
        IconError::Config {
            message: message.into(),
            help: help.map(str::to_string),
        }
    }
}

pub type Result<T> = std::result::Result<T, IconError>;
