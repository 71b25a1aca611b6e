//! Where statement text and tables come from.
//!
//! `pdf-extract` yields page text only, so a `PdfSource` produces no tables
//! and the text fallback carries every record. A `DumpSource` reads the JSON
//! written by an external table extractor:
//!
//!   { "full_text": "...", "tables": [[["11/23", "11/24", ...], ...], ...] }

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::ExtractedStatement;

pub trait StatementSource {
    fn extract(&self) -> Result<ExtractedStatement>;
}

#[derive(Debug, Clone)]
pub enum PdfSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// Join form-feed separated pages into newline-terminated page text.
fn join_pages(raw: &str) -> String {
    let mut full_text = String::new();
    for page in raw.split('\u{000C}') {
        if page.trim().is_empty() {
            continue;
        }
        full_text.push_str(page);
        full_text.push('\n');
    }
    full_text
}

impl StatementSource for PdfSource {
    fn extract(&self) -> Result<ExtractedStatement> {
        let raw = match self {
            PdfSource::File(path) => pdf_extract::extract_text(path)
                .map_err(|e| anyhow!("reading PDF text from {}: {e}", path.display()))?,
            PdfSource::Bytes(bytes) => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| anyhow!("reading PDF text: {e}"))?,
        };

        Ok(ExtractedStatement {
            full_text: join_pages(&raw),
            tables: Vec::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DumpSource(pub PathBuf);

impl StatementSource for DumpSource {
    fn extract(&self) -> Result<ExtractedStatement> {
        let s = fs::read_to_string(&self.0).with_context(|| format!("read {}", self.0.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse extraction dump {}", self.0.display()))
    }
}

/// `.pdf` files go through the PDF extractor; anything else is read as a
/// JSON extraction dump.
pub fn load_statement(path: impl AsRef<Path>) -> Result<ExtractedStatement> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        PdfSource::File(path.to_path_buf()).extract()
    } else {
        DumpSource(path.to_path_buf()).extract()
    }
}
