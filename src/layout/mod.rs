//! Layouts de folha de ponto reconhecidos.
//!
//! Cada [`LayoutVariant`] escolhe o caminho de leitura do documento
//! (células de tabela ou texto de OCR), a estratégia de segmentação e a
//! entrada correspondente na tabela de assinaturas.

mod locator;
mod signature;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use locator::{RowRegion, locate};
pub use signature::{
    CompiledSignature, LayoutSignature, SIGNATURE_VERSION, SignatureOverride, SignatureTable,
};

/// Layout de documento escolhido na submissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    /// Espelho de ponto com uma linha por data (`DD/MM/AAAA`), lido por OCR.
    #[serde(alias = "1")]
    Jornada,
    /// Tabela com marcadores `Seg 01/11/21` e cabeçalho de competência.
    #[serde(alias = "2")]
    Competencia,
    /// Folha com `Período: d.m.aaaa a d.m.aaaa`, percorrida dia a dia.
    #[serde(alias = "3")]
    Periodo,
}

/// Where the pages of a document come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Table,
    Ocr,
}

/// How a located row region is split into per-date slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    LineAnchored,
    MarkerSlicing,
    CalendarWalk,
}

impl LayoutVariant {
    pub const ALL: [LayoutVariant; 3] = [
        LayoutVariant::Jornada,
        LayoutVariant::Competencia,
        LayoutVariant::Periodo,
    ];

    pub fn source_kind(self) -> SourceKind {
        match self {
            LayoutVariant::Jornada | LayoutVariant::Periodo => SourceKind::Ocr,
            LayoutVariant::Competencia => SourceKind::Table,
        }
    }

    pub fn strategy(self) -> SegmentStrategy {
        match self {
            LayoutVariant::Jornada => SegmentStrategy::LineAnchored,
            LayoutVariant::Competencia => SegmentStrategy::MarkerSlicing,
            LayoutVariant::Periodo => SegmentStrategy::CalendarWalk,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutVariant::Jornada => "jornada",
            LayoutVariant::Competencia => "competencia",
            LayoutVariant::Periodo => "periodo",
        }
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jornada" | "1" => Ok(LayoutVariant::Jornada),
            "competencia" | "competência" | "2" => Ok(LayoutVariant::Competencia),
            "periodo" | "período" | "3" => Ok(LayoutVariant::Periodo),
            other => Err(format!("layout desconhecido: {other}")),
        }
    }
}
