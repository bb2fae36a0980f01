//! Report renderer trait.

use crate::types::report::InspectionReport;
use crate::Error;

/// Abstraction for turning a finished inspection into a downloadable document.
///
/// Implementations own the document format (plain text, HTML, PDF). Rendering
/// never decides completion; it consumes a report already assembled from the
/// answer ledger.
pub trait Renderer: Send + Sync {
    /// Render the report into document bytes.
    fn render(&self, report: &InspectionReport) -> std::result::Result<Vec<u8>, Error>;

    /// MIME type of the rendered document (e.g., "text/plain; charset=utf-8").
    fn content_type(&self) -> &str;

    /// File extension for the rendered document, without the leading dot.
    fn file_extension(&self) -> &str;
}
