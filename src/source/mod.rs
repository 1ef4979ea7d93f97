//! Páginas de entrada e os backends externos que as produzem.
//!
//! O motor de extração não lê PDF nem faz OCR: recebe páginas já convertidas
//! em grade de células (backend de tabelas) ou em linhas de texto
//! (rasterizador + OCR). Os traits deste módulo são o ponto de encaixe
//! desses colaboradores; [`PageProvider`] unifica os dois caminhos.

mod text_dump;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::SourceError;

pub use text_dump::{DumpMode, TextDumpPages};

/// Conteúdo de uma página, imutável depois de produzido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// Linhas de uma grade de tabela, cada uma com suas células em ordem.
    Cells(Vec<Vec<String>>),
    /// Linhas de texto livre (OCR).
    Lines(Vec<String>),
}

impl PageSource {
    /// Line view used by the locator and segmenters; cells are joined by a space.
    pub fn lines(&self) -> Vec<String> {
        match self {
            PageSource::Cells(rows) => rows.iter().map(|row| row.join(" ")).collect(),
            PageSource::Lines(lines) => lines.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub source: PageSource,
}

/// Seleção de páginas: `all`, `n` ou `n-m` (base 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    All,
    Single(u32),
    Range(u32, u32),
}

impl PageSelector {
    pub fn first(&self) -> u32 {
        match self {
            PageSelector::All => 1,
            PageSelector::Single(n) | PageSelector::Range(n, _) => *n,
        }
    }

    /// Resolves the selection against a document with `total` pages.
    pub fn resolve(&self, total: u32) -> Result<Vec<u32>, SourceError> {
        let (start, end) = match *self {
            PageSelector::All => return Ok((1..=total).collect()),
            PageSelector::Single(n) => (n, n),
            PageSelector::Range(a, b) => (a, b),
        };
        if start == 0 || end > total {
            return Err(SourceError::PageOutOfRange {
                page: if start == 0 { 0 } else { end },
                available: total,
            });
        }
        Ok((start..=end).collect())
    }
}

impl FromStr for PageSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSelector::All);
        }
        let page = |t: &str| -> Result<u32, String> {
            match t.trim().parse::<u32>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(format!("página inválida: '{t}'")),
            }
        };
        match s.split_once('-') {
            Some((a, b)) => {
                let (a, b) = (page(a)?, page(b)?);
                if a > b {
                    return Err(format!("intervalo invertido: {a}-{b}"));
                }
                Ok(PageSelector::Range(a, b))
            }
            None => Ok(PageSelector::Single(page(s)?)),
        }
    }
}

impl fmt::Display for PageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelector::All => f.write_str("all"),
            PageSelector::Single(n) => write!(f, "{n}"),
            PageSelector::Range(a, b) => write!(f, "{a}-{b}"),
        }
    }
}

/// Grade de células de uma tabela detectada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGrid {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
}

/// Imagem rasterizada de uma página.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page: u32,
    pub bytes: Vec<u8>,
}

/// Backend de extração de tabelas (modo stream). Falha se não houver tabela.
pub trait TableExtractor: Send + Sync {
    fn extract_tables(
        &self,
        document: &Path,
        selector: &PageSelector,
    ) -> Result<Vec<TableGrid>, SourceError>;
}

/// Converte as páginas selecionadas em imagens, na resolução pedida.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        document: &Path,
        selector: &PageSelector,
        dpi: u32,
    ) -> Result<Vec<PageImage>, SourceError>;
}

/// Reconhecimento de texto de uma imagem de página.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &PageImage) -> Result<String, SourceError>;
}

/// Turns a stored document into pages for the pipeline.
pub trait PageProvider: Send + Sync {
    fn load(&self, document: &Path, selector: &PageSelector) -> Result<Vec<Page>, SourceError>;
}

/// Caminho de tabelas: agrupa as grades por página, na ordem das páginas.
pub struct TablePages<T> {
    extractor: T,
}

impl<T: TableExtractor> TablePages<T> {
    pub fn new(extractor: T) -> Self {
        Self { extractor }
    }
}

impl<T: TableExtractor> PageProvider for TablePages<T> {
    fn load(&self, document: &Path, selector: &PageSelector) -> Result<Vec<Page>, SourceError> {
        let grids = self.extractor.extract_tables(document, selector)?;
        if grids.is_empty() {
            return Err(SourceError::NoTables(selector.to_string()));
        }
        let mut by_page: BTreeMap<u32, Vec<Vec<String>>> = BTreeMap::new();
        for grid in grids {
            by_page.entry(grid.page).or_default().extend(grid.rows);
        }
        Ok(by_page
            .into_iter()
            .map(|(number, rows)| Page {
                number,
                source: PageSource::Cells(rows),
            })
            .collect())
    }
}

/// Caminho de OCR: rasteriza e reconhece cada página. Falhas de OCR viram
/// página vazia, como o backend faria.
pub struct OcrPages<R, O> {
    rasterizer: R,
    ocr: O,
    dpi: u32,
}

impl<R: Rasterizer, O: OcrEngine> OcrPages<R, O> {
    pub const DEFAULT_DPI: u32 = 300;

    pub fn new(rasterizer: R, ocr: O) -> Self {
        Self {
            rasterizer,
            ocr,
            dpi: Self::DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

impl<R: Rasterizer, O: OcrEngine> PageProvider for OcrPages<R, O> {
    fn load(&self, document: &Path, selector: &PageSelector) -> Result<Vec<Page>, SourceError> {
        let images = self.rasterizer.rasterize(document, selector, self.dpi)?;
        Ok(images
            .iter()
            .map(|image| {
                let text = self.ocr.recognize(image).unwrap_or_else(|e| {
                    tracing::warn!(page = image.page, error = %e, "OCR falhou, página vazia");
                    String::new()
                });
                Page {
                    number: image.page,
                    source: PageSource::Lines(text.lines().map(str::to_string).collect()),
                }
            })
            .collect())
    }
}
