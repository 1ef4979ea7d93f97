use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jobs::JobId;

#[derive(Debug, Error)]
pub enum PontoError {
    #[error("Entrada ausente ou inválida: {0}")]
    InputMissing(String),

    #[error("Layout não reconhecido em nenhuma página")]
    LayoutUnrecognized,

    #[error("Layout reconhecido, mas nenhuma data foi extraída")]
    ExtractionEmpty,

    #[error("Tarefa não encontrada: {0}")]
    NotFound(JobId),

    #[error("Tarefa ainda não foi concluída: {0}")]
    NotReady(JobId),

    #[error("Erro interno: {0}")]
    Internal(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl PontoError {
    /// Classifies the error for the job record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PontoError::InputMissing(_) => ErrorKind::InputMissing,
            PontoError::LayoutUnrecognized => ErrorKind::LayoutUnrecognized,
            PontoError::ExtractionEmpty => ErrorKind::ExtractionEmpty,
            PontoError::NotFound(_) => ErrorKind::NotFound,
            PontoError::NotReady(_) => ErrorKind::NotReady,
            _ => ErrorKind::Internal,
        }
    }
}

/// Errors raised by the document backends (table extraction, rasterizer, OCR).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("nenhuma estrutura tabular encontrada nas páginas {0}")]
    NoTables(String),

    #[error("página {page} fora do documento ({available} páginas)")]
    PageOutOfRange { page: u32, available: u32 },

    #[error("falha no backend: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classification stored on a failed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputMissing,
    LayoutUnrecognized,
    ExtractionEmpty,
    NotFound,
    NotReady,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InputMissing => write!(f, "InputMissing"),
            ErrorKind::LayoutUnrecognized => write!(f, "LayoutUnrecognized"),
            ErrorKind::ExtractionEmpty => write!(f, "ExtractionEmpty"),
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::NotReady => write!(f, "NotReady"),
            ErrorKind::Internal => write!(f, "Internal"),
        }
    }
}

pub type Result<T, E = PontoError> = std::result::Result<T, E>;
