//! Serialização do resultado da extração em arquivo para download.
//!
//! CSV com separador `;` (formato padrão) ou JSON. A coluna `pagina` só
//! aparece quando o resultado vem de mais de uma página.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PontoError, Result};
use crate::extract::PunchRecord;
use crate::layout::LayoutVariant;
use crate::source::PageSelector;

const CSV_HEADER: [&str; 6] = ["data", "dia_semana", "entrada1", "saida1", "entrada2", "saida2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Csv,
    Json,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Csv => "csv",
            ArtifactFormat::Json => "json",
        }
    }
}

#[derive(Debug, Serialize)]
struct Row {
    data: String,
    dia_semana: &'static str,
    entrada1: String,
    saida1: String,
    entrada2: String,
    saida2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagina: Option<u32>,
}

impl Row {
    fn from_record(record: &PunchRecord, with_page: bool) -> Self {
        let p = &record.punches;
        Self {
            data: record.date.format("%d/%m/%Y").to_string(),
            dia_semana: record.weekday,
            entrada1: p.entrada1().to_string(),
            saida1: p.saida1().to_string(),
            entrada2: p.entrada2().to_string(),
            saida2: p.saida2().to_string(),
            pagina: with_page.then_some(record.page),
        }
    }
}

/// True when the records come from more than one page.
pub fn spans_pages(records: &[PunchRecord]) -> bool {
    records
        .first()
        .is_some_and(|first| records.iter().any(|r| r.page != first.page))
}

pub fn render(records: &[PunchRecord], format: ArtifactFormat) -> Result<Vec<u8>> {
    let with_page = spans_pages(records);
    let rows: Vec<Row> = records
        .iter()
        .map(|r| Row::from_record(r, with_page))
        .collect();

    match format {
        ArtifactFormat::Json => Ok(serde_json::to_vec_pretty(&rows)?),
        ArtifactFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b';')
                .has_headers(false)
                .from_writer(Vec::new());
            if with_page {
                writer.write_record(CSV_HEADER.iter().chain(std::iter::once(&"pagina")))?;
            } else {
                writer.write_record(CSV_HEADER)?;
            }
            for row in &rows {
                let mut fields = vec![
                    row.data.clone(),
                    row.dia_semana.to_string(),
                    row.entrada1.clone(),
                    row.saida1.clone(),
                    row.entrada2.clone(),
                    row.saida2.clone(),
                ];
                if let Some(page) = row.pagina {
                    fields.push(page.to_string());
                }
                writer.write_record(&fields)?;
            }
            writer
                .into_inner()
                .map_err(|e| PontoError::Internal(format!("falha ao finalizar CSV: {e}")))
        }
    }
}

/// `resultado_<layout>_<nome>_pag_<páginas>.<ext>`, com `-` trocado por `_`.
pub fn file_name(
    layout: LayoutVariant,
    document_name: &str,
    pages: &PageSelector,
    format: ArtifactFormat,
) -> String {
    let stem = Path::new(document_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "documento".to_string());
    format!(
        "resultado_{}_{}_pag_{}.{}",
        layout,
        stem,
        pages.to_string().replace('-', "_"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::calendar::weekday_label;
    use crate::extract::{Punch, PunchVector};
    use chrono::{NaiveDate, NaiveTime};

    fn record(day: u32, page: u32, punches: PunchVector) -> PunchRecord {
        let date = NaiveDate::from_ymd_opt(2021, 11, day).unwrap();
        PunchRecord {
            date,
            weekday: weekday_label(date),
            punches,
            page,
        }
    }

    fn at(h: u32, m: u32) -> Punch {
        Punch::At(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn csv_single_page_has_no_page_column() {
        let records = vec![
            record(1, 1, PunchVector([at(8, 0), at(12, 0), at(13, 0), Punch::EndOfDay])),
            record(2, 1, PunchVector::ABSENT),
        ];
        let csv = String::from_utf8(render(&records, ArtifactFormat::Csv).unwrap()).unwrap();
        assert_eq!(
            csv,
            "data;dia_semana;entrada1;saida1;entrada2;saida2\n\
             01/11/2021;SEG;08:00;12:00;13:00;24:00\n\
             02/11/2021;TER;0;0;0;0\n"
        );
    }

    #[test]
    fn csv_multi_page_adds_page_column() {
        let records = vec![
            record(1, 1, PunchVector::ABSENT),
            record(8, 2, PunchVector([at(8, 0), at(12, 0), Punch::Absent, Punch::Absent])),
        ];
        let csv = String::from_utf8(render(&records, ArtifactFormat::Csv).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "data;dia_semana;entrada1;saida1;entrada2;saida2;pagina");
        assert_eq!(lines[2], "08/11/2021;SEG;08:00;12:00;0;0;2");
    }

    #[test]
    fn json_rows() {
        let records = vec![record(3, 5, PunchVector::ABSENT)];
        let bytes = render(&records, ArtifactFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["data"], "03/11/2021");
        assert_eq!(value[0]["dia_semana"], "QUA");
        assert_eq!(value[0]["saida2"], "0");
        assert!(value[0].get("pagina").is_none());
    }

    #[test]
    fn file_name_follows_pattern() {
        assert_eq!(
            file_name(
                LayoutVariant::Competencia,
                "espelho novembro.pdf",
                &PageSelector::Range(1, 3),
                ArtifactFormat::Csv
            ),
            "resultado_competencia_espelho novembro_pag_1_3.csv"
        );
        assert_eq!(
            file_name(LayoutVariant::Jornada, "", &PageSelector::All, ArtifactFormat::Json),
            "resultado_jornada_documento_pag_all.json"
        );
    }

    #[test]
    fn format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            f: ArtifactFormat,
        }
        let w: Wrap = toml::from_str("f = \"json\"").unwrap();
        assert_eq!(w.f, ArtifactFormat::Json);
    }
}
