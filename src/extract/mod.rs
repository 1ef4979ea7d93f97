//! Motor de extração: segmentação, leitura de horários, validação dos pares
//! e reconciliação com o calendário.

pub mod calendar;
pub mod fields;
pub mod pipeline;
pub mod punch;
pub mod segment;

use chrono::NaiveDate;

pub use pipeline::{ExtractionPipeline, PageOutcome, ProgressUpdate, TOTAL_STEPS};
pub use punch::{Punch, PunchVector};
pub use segment::{DateSlice, RecordOrder, Segmenter};

/// Um dia de marcações já validado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunchRecord {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub punches: PunchVector,
    /// Página de origem no documento.
    pub page: u32,
}
