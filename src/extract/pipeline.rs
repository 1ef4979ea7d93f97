use std::path::Path;

use super::calendar::reconcile_page;
use super::fields::extract_punches;
use super::segment::{Segmenter, segmenter_for};
use super::PunchRecord;
use crate::error::{PontoError, Result};
use crate::layout::{self, CompiledSignature, LayoutVariant};
use crate::source::{Page, PageProvider, PageSelector};

/// Passos reportados por uma execução completa, incluindo a geração do
/// arquivo de saída feita pelo gerenciador de tarefas.
pub const TOTAL_STEPS: u32 = 10;

/// Progress snapshot sent after each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub step: u32,
    pub total: u32,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(step: u32, message: impl Into<String>) -> Self {
        Self {
            step: step.min(TOTAL_STEPS),
            total: TOTAL_STEPS,
            message: message.into(),
        }
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.step.min(self.total) * 100 / self.total) as u8
    }
}

/// Result of running the locator and segmenter on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Unrecognized,
    Records(Vec<PunchRecord>),
}

/// Localizador → segmentador → extrator + validador → reconciliador, página
/// a página.
pub struct ExtractionPipeline {
    variant: LayoutVariant,
    signature: CompiledSignature,
    segmenter: Box<dyn Segmenter>,
}

impl ExtractionPipeline {
    pub fn new(variant: LayoutVariant, signature: CompiledSignature) -> Self {
        Self {
            variant,
            signature,
            segmenter: segmenter_for(variant.strategy()),
        }
    }

    pub fn variant(&self) -> LayoutVariant {
        self.variant
    }

    pub fn extract_page(&self, page: &Page) -> PageOutcome {
        let lines = page.source.lines();
        let Some(region) = layout::locate(&lines, &self.signature) else {
            return PageOutcome::Unrecognized;
        };
        let Some(slices) = self.segmenter.segment(&lines, region) else {
            return PageOutcome::Unrecognized;
        };
        let entries = slices
            .into_iter()
            .map(|slice| {
                let punches = extract_punches(&slice.raw, &self.signature).validate();
                (slice.date, punches)
            })
            .collect();
        PageOutcome::Records(reconcile_page(entries, page.number, self.segmenter.order()))
    }

    /// Runs every page and concatenates the records in page order.
    pub fn extract_pages(
        &self,
        pages: &[Page],
        report: &dyn Fn(ProgressUpdate),
    ) -> Result<Vec<PunchRecord>> {
        let total = pages.len();
        let mut recognized = 0usize;
        let mut records = Vec::new();

        for (i, page) in pages.iter().enumerate() {
            let step = 3 + ((i + 1) * 5 / total.max(1)) as u32;
            match self.extract_page(page) {
                PageOutcome::Unrecognized => {
                    tracing::debug!(page = page.number, layout = %self.variant, "layout não reconhecido na página");
                }
                PageOutcome::Records(page_records) => {
                    tracing::debug!(page = page.number, records = page_records.len(), "página processada");
                    recognized += 1;
                    records.extend(page_records);
                }
            }
            report(ProgressUpdate::new(
                step,
                format!("Processando página {} de {}...", i + 1, total),
            ));
        }

        if total == 0 {
            return Err(PontoError::ExtractionEmpty);
        }
        if recognized == 0 {
            return Err(PontoError::LayoutUnrecognized);
        }
        if records.is_empty() {
            return Err(PontoError::ExtractionEmpty);
        }
        report(ProgressUpdate::new(9, "Consolidando dados extraídos..."));
        Ok(records)
    }

    /// Loads the document through `provider` and extracts every page.
    pub fn run(
        &self,
        provider: &dyn PageProvider,
        document: &Path,
        selector: &PageSelector,
        report: &dyn Fn(ProgressUpdate),
    ) -> Result<Vec<PunchRecord>> {
        report(ProgressUpdate::new(1, "Carregando páginas do documento..."));
        let pages = provider.load(document, selector)?;
        report(ProgressUpdate::new(
            2,
            format!("{} páginas encontradas.", pages.len()),
        ));
        self.extract_pages(&pages, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::extract::PunchVector;
    use crate::layout::LayoutSignature;
    use crate::source::PageSource;
    use chrono::{Datelike, NaiveDate};
    use std::sync::Mutex;

    fn pipeline(variant: LayoutVariant) -> ExtractionPipeline {
        ExtractionPipeline::new(variant, LayoutSignature::builtin(variant).compile().unwrap())
    }

    fn lines_page(number: u32, text: &str) -> Page {
        Page {
            number,
            source: PageSource::Lines(text.lines().map(str::to_string).collect()),
        }
    }

    const JORNADA_PAGE: &str = "\
JBS S/A - Espelho de ponto
Dia        Marcação ou Situação      FALTAS  AD.NOT  H.E.100%  SALDO
01/11/2021 Seg 07:58 12:00 13:00 17:02                  08:04
02/11/2021 Ter FOLGA
03/11/2021 Qua 07:55 12:01 13:02
04/11/2021 Qui 08:00
05/11/2021 Sex 22:00 00:00          AD.NOT 02:00
Assinatura do funcionário ____________";

    #[test]
    fn jornada_page_end_to_end() {
        let p = pipeline(LayoutVariant::Jornada);
        let PageOutcome::Records(records) = p.extract_page(&lines_page(1, JORNADA_PAGE)) else {
            panic!("expected records");
        };
        let rows: Vec<String> = records
            .iter()
            .map(|r| format!("{} {} {}", r.date.day(), r.weekday, r.punches))
            .collect();
        assert_eq!(
            rows,
            vec![
                "1 SEG [07:58, 12:00, 13:00, 17:02]",
                "2 TER [0, 0, 0, 0]",
                "3 QUA [07:55, 12:01, 0, 0]",
                "4 QUI [0, 0, 0, 0]",
                "5 SEX [22:00, 24:00, 0, 0]",
            ]
        );
        assert!(records.iter().all(|r| r.punches.is_paired()));
    }

    #[test]
    fn competencia_page_from_cells() {
        let p = pipeline(LayoutVariant::Competencia);
        let page = Page {
            number: 4,
            source: PageSource::Cells(vec![
                vec!["Mes/Ano Competencia:".into(), "Novembro/2021".into()],
                vec!["Seg 01/11/21".into(), "07:58".into(), "12:00".into(), "Ter 02/11/21".into()],
                vec!["13:00".into(), "17:00".into(), "Saldo 08:00".into()],
            ]),
        };
        let PageOutcome::Records(records) = p.extract_page(&page) else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].punches.to_string(), "[07:58, 12:00, 0, 0]");
        assert_eq!(records[1].punches.to_string(), "[13:00, 17:00, 0, 0]");
        assert_eq!(records[1].weekday, "TER");
        assert_eq!(records[1].page, 4);
    }

    #[test]
    fn periodo_page_is_gap_free() {
        let text = "\
Empresa Y   Período: 16.1.2019 a 15.2.2019
Dia  Entrada  Saída  Entrada  Saída
16 QUA 08:00 12:00 13:00 17:00
17 QUI 08:00
18 SEX FERIADO
21 SEG 08:10 12:00
Total 40:00";
        let p = pipeline(LayoutVariant::Periodo);
        let PageOutcome::Records(records) = p.extract_page(&lines_page(1, text)) else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 31);
        assert!(records.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(records[0].punches.to_string(), "[08:00, 12:00, 13:00, 17:00]");
        assert_eq!(records[1].punches, PunchVector::ABSENT);
        assert_eq!(records[5].date, NaiveDate::from_ymd_opt(2019, 1, 21).unwrap());
        assert_eq!(records[5].punches.to_string(), "[08:10, 12:00, 0, 0]");
        assert_eq!(records[30].weekday, "SEX");
    }

    #[test]
    fn unrecognized_everywhere_fails() {
        let p = pipeline(LayoutVariant::Jornada);
        let pages = vec![lines_page(1, "nada aqui"), lines_page(2, "nem aqui")];
        let err = p.extract_pages(&pages, &|_| {}).unwrap_err();
        assert!(matches!(err, PontoError::LayoutUnrecognized));
    }

    #[test]
    fn recognized_but_empty_fails() {
        let p = pipeline(LayoutVariant::Jornada);
        let pages = vec![lines_page(1, "Dia Marcação\nsem datas\nTotal")];
        let err = p.extract_pages(&pages, &|_| {}).unwrap_err();
        assert!(matches!(err, PontoError::ExtractionEmpty));
    }

    #[test]
    fn pages_are_concatenated_with_numbers() {
        let p = pipeline(LayoutVariant::Jornada);
        let pages = vec![
            lines_page(3, "Dia Marcação\n01/11/2021 Seg 08:00 12:00"),
            lines_page(4, "lixo"),
            lines_page(5, "Data Situação\n02/11/2021 Ter 08:00 12:00"),
        ];
        let records = p.extract_pages(&pages, &|_| {}).unwrap();
        let pages: Vec<u32> = records.iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![3, 5]);
    }

    struct FixedPages(Vec<Page>);

    impl PageProvider for FixedPages {
        fn load(&self, _: &Path, _: &PageSelector) -> std::result::Result<Vec<Page>, SourceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn run_reports_monotonic_progress() {
        let p = pipeline(LayoutVariant::Jornada);
        let provider = FixedPages(vec![lines_page(1, JORNADA_PAGE), lines_page(2, JORNADA_PAGE)]);
        let seen = Mutex::new(Vec::new());
        let records = p
            .run(&provider, Path::new("x.pdf"), &PageSelector::All, &|u| {
                seen.lock().unwrap().push(u.step)
            })
            .unwrap();
        assert_eq!(records.len(), 10);
        let steps = seen.into_inner().unwrap();
        assert_eq!(steps, vec![1, 2, 5, 8, 9]);
    }

    #[test]
    fn progress_percent() {
        assert_eq!(ProgressUpdate::new(3, "x").percent(), 30);
        assert_eq!(ProgressUpdate::new(10, "x").percent(), 100);
        assert_eq!(ProgressUpdate::new(42, "x").percent(), 100);
    }
}
