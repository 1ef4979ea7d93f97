use chrono::Utc;
use thiserror::Error;

use super::job::{ExtractionJob, JobError, JobState, ResultArtifact};
use crate::extract::ProgressUpdate;

/// Something that happened to a job, as reported by its worker.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// The worker picked the job up.
    Started,
    Progressed(ProgressUpdate),
    Succeeded(ResultArtifact),
    Failed(JobError),
}

impl JobEvent {
    fn name(&self) -> &'static str {
        match self {
            JobEvent::Started => "started",
            JobEvent::Progressed(_) => "progressed",
            JobEvent::Succeeded(_) => "succeeded",
            JobEvent::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transição inválida: {event} em {from}")]
pub struct InvalidTransition {
    pub from: JobState,
    pub event: &'static str,
}

/// Drives an [`ExtractionJob`] through `Pending → Running → Completed | Failed`.
pub struct StateMachine;

impl StateMachine {
    /// Applies `event` to `job`, or leaves it untouched and returns an error
    /// when the event is not valid in the current state.
    ///
    /// - `Started` moves `Pending` to `Running`.
    /// - `Progressed` only applies while `Running`; the percentage never goes
    ///   backwards and stays below 100 until completion.
    /// - `Succeeded` moves `Running` to `Completed` and attaches the artifact.
    /// - `Failed` is accepted from `Pending` or `Running`.
    /// - `Completed` and `Failed` are terminal.
    pub fn apply(job: &mut ExtractionJob, event: JobEvent) -> Result<(), InvalidTransition> {
        let invalid = InvalidTransition {
            from: job.state,
            event: event.name(),
        };
        match (job.state, event) {
            (JobState::Pending, JobEvent::Started) => {
                job.state = JobState::Running;
                job.message = "Iniciando processamento...".to_string();
            }
            (JobState::Running, JobEvent::Progressed(update)) => {
                job.progress = job.progress.max(update.percent().min(99));
                job.message = update.message;
            }
            (JobState::Running, JobEvent::Succeeded(artifact)) => {
                job.state = JobState::Completed;
                job.progress = 100;
                job.message = format!("Concluído: {} registros.", artifact.records);
                job.artifact = Some(artifact);
            }
            (JobState::Pending | JobState::Running, JobEvent::Failed(error)) => {
                job.state = JobState::Failed;
                job.message = error.message.clone();
                job.error = Some(error);
            }
            _ => return Err(invalid),
        }
        job.updated_at = Utc::now();
        Ok(())
    }
}
