//! Folder discovery and text extraction

mod discovery;
mod extractor;

pub use discovery::discover_files;
pub use extractor::{join_pages, PdfTextExtractor, TextExtractor};

#[cfg(test)]
pub(crate) use extractor::tests::build_pdf;
#[cfg(test)]
pub(crate) use extractor::run_parser;
