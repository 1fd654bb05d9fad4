//! Narrative migration reports: model-written text laid out as a PDF.
//!
//! - [`ReportGenerator`]: embeds a record selection in a fixed template and
//!   asks the model for the report text
//! - [`pdf::render`]: draws title and text line by line on US-Letter pages
//! - [`prompt`]: the templates, including the chat prompt

mod error;
mod generator;
mod kind;
pub mod pdf;
pub mod prompt;

pub use error::ReportError;
pub use generator::ReportGenerator;
pub use kind::{PDF_MIME, ReportKind};
