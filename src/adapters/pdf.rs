use crate::domain::ports::PageSource;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Form feed: the page separator `pdftotext` writes.
const PAGE_BREAK: char = '\x0c';

/// Loads yearbook text page by page.
///
/// `.pdf` files go through the PDF text layer. `.txt` files are treated as
/// `pdftotext` output with pages separated by form feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearbookTextLoader;

impl YearbookTextLoader {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EtlError::InputNotFound {
                path: path.display().to_string(),
            },
            _ => EtlError::IoError(e),
        })
    }

    /// Splits `pdftotext` output into pages. The empty tail after the last
    /// form feed is not a page.
    pub fn split_pages(text: &str) -> Vec<String> {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        pages
    }

    fn load_pdf(path: &Path) -> Result<Vec<String>> {
        let bytes = Self::read(path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| EtlError::pdf(path.display().to_string(), e.to_string()))?;
        if pages.iter().all(|p| p.trim().is_empty()) {
            return Err(EtlError::pdf(
                path.display().to_string(),
                "no text layer (scanned yearbook?)",
            ));
        }
        Ok(pages)
    }

    fn load_text(path: &Path) -> Result<Vec<String>> {
        let bytes = Self::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::split_pages(&text))
    }
}

impl PageSource for YearbookTextLoader {
    fn load_pages(&self, path: &Path) -> Result<Vec<String>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let pages = match extension.as_deref() {
            Some("pdf") => Self::load_pdf(path)?,
            Some("txt") => Self::load_text(path)?,
            _ => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "input".to_string(),
                    value: path.display().to_string(),
                    reason: "yearbooks must be .pdf or .txt files".to_string(),
                })
            }
        };

        tracing::debug!("Loaded {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }
}
