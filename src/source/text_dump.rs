use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{Page, PageProvider, PageSelector, PageSource};
use crate::error::SourceError;

static RE_CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|;|\s{2,}").expect("valid cell separator regex"));

/// How a text dump page is turned into a [`PageSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpMode {
    #[default]
    Lines,
    /// Cells split on tabs, `;` or runs of two or more spaces.
    Cells,
}

/// Lê um texto já extraído do documento (`pdftotext -layout`, OCR feito
/// fora), com páginas separadas por form feed (`\x0c`).
#[derive(Debug, Clone, Default)]
pub struct TextDumpPages {
    mode: DumpMode,
}

impl TextDumpPages {
    pub fn new(mode: DumpMode) -> Self {
        Self { mode }
    }

    fn page_source(&self, text: &str) -> PageSource {
        match self.mode {
            DumpMode::Lines => PageSource::Lines(text.lines().map(str::to_string).collect()),
            DumpMode::Cells => PageSource::Cells(
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| {
                        RE_CELL_SEPARATOR
                            .split(l.trim())
                            .map(str::to_string)
                            .collect()
                    })
                    .collect(),
            ),
        }
    }
}

impl PageProvider for TextDumpPages {
    fn load(&self, document: &Path, selector: &PageSelector) -> Result<Vec<Page>, SourceError> {
        let bytes = std::fs::read(document)?;
        let text = String::from_utf8_lossy(&bytes);
        let mut raw_pages: Vec<&str> = text.split('\x0c').collect();
        // pdftotext ends the last page with a form feed.
        if raw_pages.len() > 1 && raw_pages.last().is_some_and(|p| p.trim().is_empty()) {
            raw_pages.pop();
        }

        let numbers = selector.resolve(raw_pages.len() as u32)?;
        let pages: Vec<Page> = numbers
            .into_iter()
            .map(|n| Page {
                number: n,
                source: self.page_source(raw_pages[(n - 1) as usize]),
            })
            .collect();

        if self.mode == DumpMode::Cells
            && pages
                .iter()
                .all(|p| matches!(&p.source, PageSource::Cells(rows) if rows.is_empty()))
        {
            return Err(SourceError::NoTables(selector.to_string()));
        }
        Ok(pages)
    }
}
