use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;

use super::job::{ExtractionJob, JobId};
use super::state::{JobEvent, StateMachine};
use crate::error::{PontoError, Result};

/// Thread-safe store of jobs keyed by id.
///
/// Lifecycle: inserted at submit, replaced on every worker event, removed by
/// the post-fetch cleanup. Updates are computed on a copy and swapped in under
/// the write lock, so readers only ever see whole records.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, ExtractionJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: ExtractionJob) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.id, job);
    }

    pub fn get(&self, id: JobId) -> Option<ExtractionJob> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Applies a state machine event to the job.
    pub fn apply(&self, id: JobId, event: JobEvent) -> Result<()> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let current = jobs.get(&id).ok_or(PontoError::NotFound(id))?;
        let mut next = current.clone();
        StateMachine::apply(&mut next, event).map_err(|e| PontoError::Internal(e.to_string()))?;
        jobs.insert(id, next);
        Ok(())
    }

    /// Records the first fetch of a job. Returns `true` only for that first
    /// call, so cleanup is scheduled once.
    pub fn mark_fetched(&self, id: JobId) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.get_mut(&id) {
            Some(job) if job.fetched_at.is_none() => {
                job.fetched_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, id: JobId) -> Option<ExtractionJob> {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
