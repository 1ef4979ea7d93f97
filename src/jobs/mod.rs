//! Gerenciador assíncrono de tarefas de extração.

mod job;
mod manager;
mod registry;
mod state;

pub use job::{
    ExtractionJob, FetchedArtifact, JobError, JobId, JobProgress, JobState, ResultArtifact,
};
pub use manager::{Document, JobManager, ManagerSettings, Providers};
pub use registry::JobRegistry;
pub use state::{InvalidTransition, JobEvent, StateMachine};
