//! PDF to plain text.

use lopdf::Document;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ExtractionError(pub String);

pub trait DocumentExtractor: Send + Sync {
    /// Text of every page, in document order.
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError>;

    /// All page text joined with no separator.
    fn extract_text(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.extract_pages(pdf)?.concat())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl DocumentExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let document = Document::load_mem(pdf)
            .map_err(|e| ExtractionError(format!("Failed to open PDF: {}", e)))?;

        // BTreeMap keyed by page number, so iteration is document order
        document
            .get_pages()
            .keys()
            .map(|&number| {
                document.extract_text(&[number]).map_err(|e| {
                    ExtractionError(format!("Failed to read page {}: {}", number, e))
                })
            })
            .collect()
    }
}
