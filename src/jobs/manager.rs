use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use super::job::{ExtractionJob, FetchedArtifact, JobError, JobId, JobProgress, JobState, ResultArtifact};
use super::registry::JobRegistry;
use super::state::JobEvent;
use crate::artifact::{self, ArtifactFormat};
use crate::config::PontoConfig;
use crate::error::{PontoError, Result};
use crate::extract::{ExtractionPipeline, ProgressUpdate, TOTAL_STEPS};
use crate::layout::{LayoutVariant, SignatureTable, SourceKind};
use crate::source::{PageProvider, PageSelector};

/// Documento enviado pelo chamador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Page providers per source path.
#[derive(Clone)]
pub struct Providers {
    table: Arc<dyn PageProvider>,
    ocr: Arc<dyn PageProvider>,
}

impl Providers {
    pub fn new(table: Arc<dyn PageProvider>, ocr: Arc<dyn PageProvider>) -> Self {
        Self { table, ocr }
    }

    /// Same provider for both paths.
    pub fn uniform(provider: Arc<dyn PageProvider>) -> Self {
        Self {
            table: Arc::clone(&provider),
            ocr: provider,
        }
    }

    fn for_kind(&self, kind: SourceKind) -> Arc<dyn PageProvider> {
        match kind {
            SourceKind::Table => Arc::clone(&self.table),
            SourceKind::Ocr => Arc::clone(&self.ocr),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Root under which each job gets its own directory.
    pub work_dir: PathBuf,
    /// Delay between the first fetch and the removal of the job.
    pub grace_delay: Duration,
    pub format: ArtifactFormat,
}

impl From<&PontoConfig> for ManagerSettings {
    fn from(config: &PontoConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            grace_delay: config.grace_delay(),
            format: config.artifact_format,
        }
    }
}

/// Runs extraction jobs off the caller's path and owns their lifecycle.
///
/// Each submitted job runs on its own tokio task, with the blocking pipeline
/// moved to the blocking pool. Callers poll [`JobManager::progress`] and
/// collect the result with [`JobManager::fetch`].
#[derive(Clone)]
pub struct JobManager {
    registry: JobRegistry,
    providers: Providers,
    signatures: Arc<SignatureTable>,
    settings: Arc<ManagerSettings>,
}

impl JobManager {
    pub fn new(settings: ManagerSettings, signatures: SignatureTable, providers: Providers) -> Self {
        Self {
            registry: JobRegistry::new(),
            providers,
            signatures: Arc::new(signatures),
            settings: Arc::new(settings),
        }
    }

    /// Builds a manager from the loaded configuration, validating its
    /// layout overrides.
    pub fn from_config(config: &PontoConfig, providers: Providers) -> Result<Self> {
        let signatures = config.signature_table()?;
        Ok(Self::new(ManagerSettings::from(config), signatures, providers))
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Validates the input, stores the document in a job directory and starts
    /// the worker. Returns as soon as the job is registered.
    pub async fn submit(
        &self,
        document: Option<Document>,
        pages: Option<&str>,
        layout: LayoutVariant,
    ) -> Result<JobId> {
        let document = document
            .filter(|d| !d.bytes.is_empty())
            .ok_or_else(|| PontoError::InputMissing("nenhum documento enviado".to_string()))?;
        let pages = pages
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PontoError::InputMissing("seleção de páginas vazia".to_string()))?;
        let pages: PageSelector = pages
            .parse()
            .map_err(PontoError::InputMissing)?;

        let id = JobId::new();
        let workspace = self.settings.work_dir.join(id.to_string());
        let stored = store_document(&workspace, &document).await?;

        self.registry.insert(ExtractionJob::new(
            id,
            layout,
            pages,
            document.name,
            workspace,
            stored,
        ));
        tracing::info!(job_id = %id, %layout, %pages, "tarefa registrada");

        let manager = self.clone();
        tokio::spawn(async move { manager.run(id).await });
        Ok(id)
    }

    /// Worker body: runs the pipeline, writes the artifact and records the
    /// outcome. The stored document is removed whatever happens.
    pub async fn run(&self, id: JobId) {
        let Some(job) = self.registry.get(id) else {
            tracing::warn!(job_id = %id, "tarefa desconhecida, nada a executar");
            return;
        };
        if let Err(e) = self.registry.apply(id, JobEvent::Started) {
            tracing::warn!(job_id = %id, error = %e, "tarefa não pôde ser iniciada");
            return;
        }
        tracing::info!(job_id = %id, "processamento iniciado");

        let document = job.document.clone();
        let manager = self.clone();
        let outcome = tokio::task::spawn_blocking(move || manager.execute(&job))
            .await
            .unwrap_or_else(|e| Err(PontoError::Internal(format!("worker interrompido: {e}"))));

        if let Err(e) = tokio::fs::remove_file(&document).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(job_id = %id, error = %e, "falha ao remover documento temporário");
        }

        let event = match outcome {
            Ok(artifact) => {
                tracing::info!(job_id = %id, records = artifact.records, file = %artifact.filename, "tarefa concluída");
                JobEvent::Succeeded(artifact)
            }
            Err(e) => {
                tracing::warn!(job_id = %id, kind = %e.kind(), error = %e, "tarefa falhou");
                JobEvent::Failed(JobError::from(&e))
            }
        };
        if let Err(e) = self.registry.apply(id, event) {
            tracing::warn!(job_id = %id, error = %e, "estado final não registrado");
        }
    }

    fn execute(&self, job: &ExtractionJob) -> Result<ResultArtifact> {
        let pipeline = ExtractionPipeline::new(job.layout, self.signatures.compile(job.layout)?);
        let provider = self.providers.for_kind(job.layout.source_kind());
        let report = |update: ProgressUpdate| {
            if let Err(e) = self.registry.apply(job.id, JobEvent::Progressed(update)) {
                tracing::debug!(job_id = %job.id, error = %e, "progresso descartado");
            }
        };

        let records = pipeline.run(provider.as_ref(), &job.document, &job.pages, &report)?;

        report(ProgressUpdate::new(TOTAL_STEPS, "Gerando arquivo de resultado..."));
        let format = self.settings.format;
        let filename = artifact::file_name(job.layout, &job.document_name, &job.pages, format);
        let bytes = artifact::render(&records, format)?;
        let path = job.workspace.join(&filename);
        std::fs::write(&path, bytes)?;

        Ok(ResultArtifact {
            filename,
            path,
            format,
            records: records.len(),
        })
    }

    pub fn progress(&self, id: JobId) -> Result<JobProgress> {
        self.registry
            .get(id)
            .map(|job| job.snapshot())
            .ok_or(PontoError::NotFound(id))
    }

    /// Returns the artifact of a completed job. The first successful fetch
    /// schedules removal of the job after the grace delay.
    pub async fn fetch(&self, id: JobId) -> Result<FetchedArtifact> {
        let job = self.registry.get(id).ok_or(PontoError::NotFound(id))?;
        if job.state != JobState::Completed {
            return Err(PontoError::NotReady(id));
        }
        let artifact = job
            .artifact
            .ok_or_else(|| PontoError::Internal(format!("tarefa {id} concluída sem arquivo")))?;
        // A cleanup that won the race leaves nothing to read.
        let bytes = tokio::fs::read(&artifact.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PontoError::NotFound(id)
            } else {
                e.into()
            }
        })?;

        if self.registry.mark_fetched(id) {
            self.schedule_cleanup(id, job.workspace);
        }
        Ok(FetchedArtifact {
            filename: artifact.filename,
            bytes,
        })
    }

    fn schedule_cleanup(&self, id: JobId, workspace: PathBuf) {
        let registry = self.registry.clone();
        let delay = self.settings.grace_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            registry.remove(id);
            if let Err(e) = tokio::fs::remove_dir_all(&workspace).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(job_id = %id, error = %e, "falha ao remover diretório da tarefa");
            }
            tracing::info!(job_id = %id, "tarefa removida");
        });
    }

    /// Removes a finished job and its directory right away, without waiting
    /// for the grace delay.
    pub async fn discard(&self, id: JobId) -> Result<()> {
        let job = self.registry.get(id).ok_or(PontoError::NotFound(id))?;
        if !job.state.is_terminal() {
            return Err(PontoError::NotReady(id));
        }
        self.registry.remove(id);
        match tokio::fs::remove_dir_all(&job.workspace).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Number of jobs currently held.
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }
}

/// Grava o documento no diretório da tarefa. Se a gravação falhar o
/// diretório é removido antes de devolver o erro.
async fn store_document(workspace: &Path, document: &Document) -> Result<PathBuf> {
    tokio::fs::create_dir_all(workspace).await?;
    let stored = workspace.join(stored_name(&document.name));
    if let Err(e) = tokio::fs::write(&stored, &document.bytes).await {
        let _ = tokio::fs::remove_dir_all(workspace).await;
        return Err(e.into());
    }
    Ok(stored)
}

/// Nome do documento dentro do diretório da tarefa: `documento.<ext>`.
fn stored_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!("documento.{ext}"),
        None => "documento".to_string(),
    }
}
