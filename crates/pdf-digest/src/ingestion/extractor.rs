//! Text extraction from PDF files

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Turns a file into plain text.
///
/// Any failure is reported as [`Error::Extraction`]; callers skip the file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of the file at `path`
    async fn read(&self, path: &Path) -> Result<String>;

    /// Extractor name for logging
    fn name(&self) -> &str;
}

/// PDF extractor backed by pdf-extract, with a lopdf fallback
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor {
    timeout: Option<Duration>,
    parsers: Option<Arc<Semaphore>>,
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on a file after `timeout`.
    ///
    /// The blocking extraction thread cannot be killed; it finishes in the
    /// background and its result is dropped. Pair this with
    /// [`with_parser_limit`](Self::with_parser_limit) to keep abandoned parsers
    /// from piling up.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap the number of live parser threads, timed-out ones included
    pub fn with_parser_limit(mut self, limit: usize) -> Self {
        self.parsers = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    /// Extract text from in-memory PDF bytes
    pub fn extract_from_mem(data: &[u8]) -> std::result::Result<String, String> {
        extract_pages(data).map(|pages| join_pages(&pages))
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn read(&self, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::extraction(path, e.to_string()))?;

        let permit = match &self.parsers {
            Some(parsers) => Some(
                parsers
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::extraction(path, e.to_string()))?,
            ),
            None => None,
        };

        run_parser(path, self.timeout, permit, move || {
            PdfTextExtractor::extract_from_mem(&data)
        })
        .await
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

/// Run `parse` on the blocking pool, optionally bounded by `limit`.
///
/// Expiry and panics both come back as [`Error::Extraction`]. `permit` moves
/// into the blocking closure and is released only when the parser returns, even
/// after the caller stopped waiting.
pub(crate) async fn run_parser<F>(
    path: &Path,
    limit: Option<Duration>,
    permit: Option<OwnedSemaphorePermit>,
    parse: F,
) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, String> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        parse()
    });

    let joined = match limit {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err(Error::extraction(
                    path,
                    format!("extraction timed out after {:.1}s", limit.as_secs_f64()),
                ));
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(message)) => Err(Error::extraction(path, message)),
        Err(e) if e.is_panic() => Err(Error::extraction(path, "PDF parser panicked")),
        Err(e) => Err(Error::extraction(path, e.to_string())),
    }
}

/// Per-page text, pdf-extract first, lopdf when pdf-extract rejects the file
fn extract_pages(data: &[u8]) -> std::result::Result<Vec<String>, String> {
    match pdf_extract::extract_text_from_mem_by_pages(data) {
        Ok(pages) => Ok(pages),
        Err(e) => {
            tracing::debug!("pdf-extract failed: {}, trying lopdf", e);
            extract_pages_fallback(data).map_err(|fallback| format!("{} (lopdf: {})", e, fallback))
        }
    }
}

fn extract_pages_fallback(data: &[u8]) -> std::result::Result<Vec<String>, String> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;

    doc.get_pages()
        .keys()
        .map(|page_number| doc.extract_text(&[*page_number]).map_err(|e| e.to_string()))
        .collect()
}

/// Join pages in order with single newlines and trim the result
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n").replace('\0', "").trim().to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal PDF with one page per entry of `pages`
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_join_pages() {
        let pages = vec!["First page.".to_string(), "Second page.\n\n".to_string()];
        assert_eq!(join_pages(&pages), "First page.\nSecond page.");
        assert_eq!(join_pages(&[]), "");
        assert_eq!(join_pages(&["a\0b  ".to_string()]), "ab");
    }

    #[test]
    fn test_extract_from_generated_pdf() {
        let bytes = build_pdf(&["Cats sleep a lot.", "Dogs run."]);
        let text = PdfTextExtractor::extract_from_mem(&bytes).unwrap();
        assert!(text.contains("Cats sleep a lot."));
        assert!(text.contains("Dogs run."));
        assert!(text.find("Cats").unwrap() < text.find("Dogs").unwrap());
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(PdfTextExtractor::extract_from_mem(b"definitely not a pdf").is_err());
    }

    #[tokio::test]
    async fn test_read_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        let err = PdfTextExtractor::new().read(&path).await.unwrap_err();
        match err {
            Error::Extraction { path: reported, .. } => assert!(reported.ends_with("broken.pdf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = PdfTextExtractor::new()
            .read(Path::new("/nonexistent/missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_read_generated_pdf_with_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, build_pdf(&["Solar output rose."])).unwrap();

        let extractor = PdfTextExtractor::new().with_timeout(Some(Duration::from_secs(30)));
        let text = extractor.read(&path).await.unwrap();
        assert!(text.contains("Solar output rose."));
    }

    #[tokio::test]
    async fn test_parser_timeout_is_extraction_error() {
        let err = run_parser(
            Path::new("slow.pdf"),
            Some(Duration::from_millis(20)),
            None,
            || {
                std::thread::sleep(Duration::from_millis(300));
                Ok("too late".to_string())
            },
        )
        .await
        .unwrap_err();

        match err {
            Error::Extraction { path, message } => {
                assert_eq!(path, "slow.pdf");
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_parser_panic_is_extraction_error() {
        let err = run_parser(Path::new("bad_font.pdf"), None, None, || {
            panic!("unsupported font encoding")
        })
        .await
        .unwrap_err();

        match err {
            Error::Extraction { message, .. } => assert!(message.contains("panicked")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timed_out_parser_keeps_its_permit() {
        let parsers = Arc::new(Semaphore::new(1));
        let permit = parsers.clone().acquire_owned().await.unwrap();

        let result = run_parser(
            Path::new("hung.pdf"),
            Some(Duration::from_millis(20)),
            Some(permit),
            || {
                std::thread::sleep(Duration::from_millis(300));
                Ok(String::new())
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(parsers.available_permits(), 0);

        let _late = tokio::time::timeout(Duration::from_secs(5), parsers.acquire())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_parser_limit_does_not_block_sequential_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, build_pdf(&["Wind output fell."])).unwrap();

        let extractor = PdfTextExtractor::new().with_parser_limit(1);
        for _ in 0..3 {
            assert!(extractor.read(&path).await.unwrap().contains("Wind output fell."));
        }
    }
}
