//! ginkgo-convert library
//!
//! Rewrites Go tests written against `testing.T` as Ginkgo specs that reach
//! their context through `mr.T()`.

pub mod ast;
pub mod config;
pub mod convert;
pub mod error;
pub mod lexer;
pub mod package;
pub mod parser;
pub mod printer;
pub mod scaffold;

pub use ast::Span;
pub use config::{ConvertConfig, Conventions, ScaffoldKind};
pub use convert::{FileOutcome, convert_file, rewrite_file};
pub use error::{ConvertError, Result, ScaffoldError};
pub use package::{Package, RunSummary, convert_package};
