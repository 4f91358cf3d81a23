//! Error types and reporting

use crate::ast::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion error
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    /// Error tied to the file it came from
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<ConvertError>,
    },

    /// Package identifier did not name a directory
    #[error("Resolution error: {message}")]
    Resolve { message: String },

    /// Import rewriting needs an existing import section
    #[error("file has no import declarations")]
    MissingImports,

    /// Tree shape the converter cannot handle
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn resolve_error(message: impl Into<String>) -> Self {
        Self::Resolve {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the offending file to an error raised while reading or
    /// rewriting it
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Lexer { .. }
            | Self::Parser { .. }
            | Self::MissingImports
            | Self::Internal { .. } => Self::InFile {
                path: path.into(),
                source: Box::new(self),
            },
            other => other,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::InFile { source, .. } => source.span(),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::Resolve { message }
            | Self::Internal { message } => message.clone(),
            Self::InFile { source, .. } => source.message(),
            other => other.to_string(),
        }
    }
}

/// Failure provisioning a package's suite file
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("failed to run `{command}` in {}: {source}", dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("`{command}` failed in {} ({status}):\n{stdout}{stderr}", dir.display())]
    Failed {
        command: String,
        dir: PathBuf,
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Report error with ariadne
///
/// Errors that carry a span are drawn against `source`; everything else is a
/// one-line message.
pub fn report_error(filename: &str, source: &str, error: &ConvertError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        ConvertError::InFile { source, .. } => match source.as_ref() {
            ConvertError::Lexer { .. } => "Lexer",
            ConvertError::Parser { .. } => "Parser",
            _ => {
                eprintln!("Error: {error}");
                return;
            }
        },
        ConvertError::Lexer { .. } => "Lexer",
        ConvertError::Parser { .. } => "Parser",
        _ => {
            eprintln!("Error: {error}");
            return;
        }
    };

    let Some(span) = error.span() else {
        eprintln!("Error: {error}");
        return;
    };
    let range = span.start.min(source.len())..span.end.min(source.len());

    let printed = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_message(format!("{kind} error"))
        .with_label(
            Label::new((filename, range))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)));
    if printed.is_err() {
        eprintln!("Error: {error}");
    }
}
