use chrono::{Datelike, NaiveDate};

use super::PunchRecord;
use super::punch::PunchVector;
use super::segment::RecordOrder;

/// Rótulos de dia da semana, de segunda (0) a domingo (6).
pub const WEEKDAY_LABELS: [&str; 7] = ["SEG", "TER", "QUA", "QUI", "SEX", "SÁB", "DOM"];

pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_monday() as usize]
}

/// Labels one page's validated vectors and applies the strategy's ordering.
///
/// Calendar output is sorted ascending by date; encounter output keeps the
/// order rows were found in, duplicates included.
pub fn reconcile_page(
    entries: Vec<(NaiveDate, PunchVector)>,
    page: u32,
    order: RecordOrder,
) -> Vec<PunchRecord> {
    let mut records: Vec<PunchRecord> = entries
        .into_iter()
        .map(|(date, punches)| PunchRecord {
            date,
            weekday: weekday_label(date),
            punches,
            page,
        })
        .collect();
    if order == RecordOrder::Calendar {
        records.sort_by_key(|r| r.date);
    }
    records
}
