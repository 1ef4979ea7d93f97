use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::ArtifactFormat;
use crate::error::{ErrorKind, PontoError};
use crate::layout::LayoutVariant;
use crate::source::PageSelector;

/// Opaque job identifier handed back by `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle of an extraction job. No retries: `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Completed => write!(f, "COMPLETED"),
            JobState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Failure detail kept on a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PontoError> for JobError {
    fn from(err: &PontoError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Arquivo de resultado gravado no diretório da tarefa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub records: usize,
}

/// Conteúdo entregue por `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A single extraction job as held in the registry.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub id: JobId,
    pub layout: LayoutVariant,
    pub pages: PageSelector,
    /// Nome original do documento enviado.
    pub document_name: String,
    /// Job-scoped directory holding the document and the artifact.
    pub workspace: PathBuf,
    pub document: PathBuf,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub artifact: Option<ResultArtifact>,
    pub error: Option<JobError>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExtractionJob {
    pub fn new(
        id: JobId,
        layout: LayoutVariant,
        pages: PageSelector,
        document_name: String,
        workspace: PathBuf,
        document: PathBuf,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            layout,
            pages,
            document_name,
            workspace,
            document,
            state: JobState::Pending,
            progress: 0,
            message: "Aguardando processamento...".to_string(),
            artifact: None,
            error: None,
            fetched_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> JobProgress {
        JobProgress {
            id: self.id,
            state: self.state,
            percent: self.progress,
            message: self.message.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view returned by `progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    pub id: JobId,
    pub state: JobState,
    pub percent: u8,
    pub message: String,
    pub error: Option<JobError>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ExtractionJob {
        ExtractionJob::new(
            JobId::new(),
            LayoutVariant::Jornada,
            PageSelector::All,
            "espelho.pdf".into(),
            PathBuf::from("/tmp/ponto/x"),
            PathBuf::from("/tmp/ponto/x/documento.pdf"),
        )
    }

    #[test]
    fn job_creation_defaults() {
        let job = job();
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.progress, 0);
        assert!(job.artifact.is_none());
        assert!(job.error.is_none());
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn job_ids_are_unique_and_parse_back() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<JobId>().unwrap(), a);
        assert!("nao-e-uuid".parse::<JobId>().is_err());
    }

    #[test]
    fn job_error_keeps_detail() {
        let err = JobError::from(&PontoError::Internal("tesseract caiu".into()));
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.message.contains("tesseract caiu"));
        assert!(err.to_string().starts_with("Internal: "));
    }

    #[test]
    fn snapshot_serializes() {
        let snap = job().snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["percent"], 0);
        assert_eq!(json["id"], snap.id.to_string());
    }

    #[test]
    fn terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }
}
