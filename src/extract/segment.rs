//! Segmentação da região de linhas em fatias de texto por data.
//!
//! Três estratégias atrás da mesma interface [`Segmenter`], escolhidas pelo
//! layout: ancorada em linha, fatiamento por marcadores e varredura de
//! calendário.

use chrono::{Datelike, NaiveDate};

use crate::layout::{RowRegion, SegmentStrategy};
use crate::parse;

/// Texto atribuído a uma data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSlice {
    pub date: NaiveDate,
    pub raw: String,
}

/// Ordering guarantee of a strategy's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    /// Order in which rows were found; duplicates are kept.
    Encounter,
    /// One slice per date of the period, ascending.
    Calendar,
}

pub trait Segmenter: Send + Sync {
    /// Splits the region into date slices. `None` means the page lacks the
    /// period header this strategy depends on.
    fn segment(&self, lines: &[String], region: RowRegion) -> Option<Vec<DateSlice>>;

    fn order(&self) -> RecordOrder {
        RecordOrder::Encounter
    }
}

pub fn segmenter_for(strategy: SegmentStrategy) -> Box<dyn Segmenter> {
    match strategy {
        SegmentStrategy::LineAnchored => Box::new(LineAnchored),
        SegmentStrategy::MarkerSlicing => Box::new(MarkerSlicing),
        SegmentStrategy::CalendarWalk => Box::new(CalendarWalk),
    }
}

/// Uma fatia por linha que começa com `DD/MM/AAAA`.
pub struct LineAnchored;

impl Segmenter for LineAnchored {
    fn segment(&self, lines: &[String], region: RowRegion) -> Option<Vec<DateSlice>> {
        let slices = lines[clamp(region, lines.len())]
            .iter()
            .filter_map(|line| {
                let (date, rest) = parse::leading_date(line)?;
                Some(DateSlice {
                    date,
                    raw: rest.to_string(),
                })
            })
            .collect();
        Some(slices)
    }
}

/// Fatia o texto achatado da região nos marcadores `Seg 01/11/21`, com
/// mês/ano vindos do cabeçalho de competência da página.
pub struct MarkerSlicing;

/// One marker and the text that follows it up to the next marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedSlice<'a> {
    pub day: u32,
    pub marker: &'a str,
    pub text: &'a str,
}

/// Splits `blob` at every day marker. Returns the text before the first
/// marker and one slice per marker; `prefix + Σ(marker + text) == blob`.
pub fn slice_at_markers(blob: &str) -> (&str, Vec<MarkedSlice<'_>>) {
    let markers = parse::day_markers(blob);
    let prefix_end = markers.first().map(|m| m.span.start).unwrap_or(blob.len());
    let slices = markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let text_end = markers
                .get(i + 1)
                .map(|next| next.span.start)
                .unwrap_or(blob.len());
            MarkedSlice {
                day: m.day,
                marker: &blob[m.span.clone()],
                text: &blob[m.span.end..text_end],
            }
        })
        .collect();
    (&blob[..prefix_end], slices)
}

impl Segmenter for MarkerSlicing {
    fn segment(&self, lines: &[String], region: RowRegion) -> Option<Vec<DateSlice>> {
        let (month, year) = parse::competencia(&lines.join(" "))?;
        let blob = lines[clamp(region, lines.len())].join(" ");
        let (_, marked) = slice_at_markers(&blob);
        let slices = marked
            .into_iter()
            .filter_map(|m| {
                let date = NaiveDate::from_ymd_opt(year, month, m.day);
                if date.is_none() {
                    tracing::debug!(day = m.day, month, year, "marcador com dia inválido ignorado");
                }
                Some(DateSlice {
                    date: date?,
                    raw: m.text.to_string(),
                })
            })
            .collect();
        Some(slices)
    }
}

/// Percorre cada data do `Período:` do documento e procura a linha cujo
/// número inicial é o dia correspondente. Datas sem linha geram fatia vazia.
pub struct CalendarWalk;

impl Segmenter for CalendarWalk {
    fn segment(&self, lines: &[String], region: RowRegion) -> Option<Vec<DateSlice>> {
        let (start, end) = parse::periodo(&lines.join(" "))?;
        let rows: Vec<(u32, &str)> = lines[clamp(region, lines.len())]
            .iter()
            .filter_map(|l| parse::leading_day(l))
            .collect();

        // A new month starts wherever the day number goes down. Each date only
        // looks inside its own month's run.
        let runs: Vec<&[(u32, &str)]> = rows.chunk_by(|a, b| b.0 >= a.0).collect();
        let mut cursors = vec![0usize; runs.len()];
        let slices = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| {
                let month = months_between(start, date);
                let raw = runs
                    .get(month)
                    .and_then(|run| {
                        let cursor = &mut cursors[month];
                        let offset = run[*cursor..]
                            .iter()
                            .position(|(day, _)| *day == date.day())?;
                        let (_, rest) = run[*cursor + offset];
                        *cursor += offset + 1;
                        Some(rest.to_string())
                    })
                    .unwrap_or_default();
                DateSlice { date, raw }
            })
            .collect();
        Some(slices)
    }

    fn order(&self) -> RecordOrder {
        RecordOrder::Calendar
    }
}

fn months_between(start: NaiveDate, date: NaiveDate) -> usize {
    let months = (date.year() - start.year()) * 12 + date.month() as i32 - start.month() as i32;
    months.max(0) as usize
}

fn clamp(region: RowRegion, len: usize) -> std::ops::Range<usize> {
    let range = region.range();
    range.start.min(len)..range.end.min(len)
}
