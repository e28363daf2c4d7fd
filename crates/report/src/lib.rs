pub mod docx;
pub mod model;
pub mod text;

use thiserror::Error;

pub use docx::DocxWriter;
pub use model::{Report, Section};
pub use text::TextWriter;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Serializes a [`Report`] into a self-contained byte stream.
///
/// Writers only decide the byte layout; the content (title, sections and
/// lines, in order) always comes from the report unchanged.
pub trait ReportWriter {
    /// File name the delivery side should offer for the document.
    fn file_name(&self) -> &str;

    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str;

    fn write(&self, report: &Report) -> Result<Vec<u8>, ReportError>;
}
