//! Tokenizadores usados pelo localizador, segmentadores e extrator.
//!
//! Cada função reconhece um único tipo de token (data, horário, marcador de
//! dia, cabeçalho de período) para que as estratégias possam ser testadas
//! isoladamente. Os padrões fixos são compilados uma única vez em
//! [`LazyLock`]; as listas de palavras-chave vêm da configuração e são
//! compiladas em [`KeywordMatcher`].

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

static RE_LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\p{L}\p{N}]*(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid leading date regex")
});
static RE_LEADING_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\p{L}\p{N}]*(\d{1,2})\b").expect("valid leading day regex"));
static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid time regex")
});
static RE_TIME_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}\b").expect("valid time-like regex"));
static RE_LOOSE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}\s+\p{Lu}\w*").expect("valid loose row regex"));
static RE_DAY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w{3}\s+(\d{2})/(\d{2})/(\d{2})\b").expect("valid day marker regex")
});
static RE_COMPETENCIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)m[eê]s\s*/\s*ano\s+compet[eê]ncia\s*:\s*(\p{L}+|\d{1,2})\s*/\s*(\d{4})")
        .expect("valid competencia regex")
});
static RE_PERIODO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)per[ií]odo\s*:?\s*(\d{1,2})[./-](\d{1,2})[./-](\d{4})\s*(?:a|at[eé]|-)\s*(\d{1,2})[./-](\d{1,2})[./-](\d{4})",
    )
    .expect("valid periodo regex")
});

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "marco", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

/// Data no início da linha (`DD/MM/AAAA`), com o restante da linha após o token.
pub fn leading_date(line: &str) -> Option<(NaiveDate, &str)> {
    let caps = RE_LEADING_DATE.captures(line)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let end = caps.get(0)?.end();
    Some((date, &line[end..]))
}

/// Número de dia do mês no início da linha, com o restante da linha.
///
/// Um número seguido de `:` é um horário, não um dia.
pub fn leading_day(line: &str) -> Option<(u32, &str)> {
    let caps = RE_LEADING_DAY.captures(line)?;
    let end = caps.get(0)?.end();
    let rest = &line[end..];
    if rest.starts_with(':') {
        return None;
    }
    let day: u32 = caps[1].parse().ok()?;
    (1..=31).contains(&day).then_some((day, rest))
}

/// Horários válidos (hora 0–23, minuto 0–59), da esquerda para a direita.
pub fn times(text: &str) -> impl Iterator<Item = NaiveTime> + '_ {
    RE_TIME.captures_iter(text).filter_map(|caps| {
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}

pub fn has_time_like(text: &str) -> bool {
    RE_TIME_LIKE.is_match(text)
}

/// Linha com cara de linha de tabela: número de 1–2 dígitos seguido de um token
/// iniciado em maiúscula.
pub fn looks_like_row_start(line: &str) -> bool {
    RE_LOOSE_ROW.is_match(line)
}

/// Marcador `Seg 01/11/21` encontrado num bloco de texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMarker {
    pub span: Range<usize>,
    pub day: u32,
}

pub fn day_markers(blob: &str) -> Vec<DayMarker> {
    RE_DAY_MARKER
        .captures_iter(blob)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let day = caps[1].parse().ok()?;
            Some(DayMarker {
                span: whole.range(),
                day,
            })
        })
        .collect()
}

/// Mês/ano de competência (`Mes/Ano Competencia: Novembro/2021`).
pub fn competencia(text: &str) -> Option<(u32, i32)> {
    let caps = RE_COMPETENCIA.captures(text)?;
    let month = month_number(&caps[1])?;
    let year = caps[2].parse().ok()?;
    Some((month, year))
}

/// Período do documento (`Período: 16.1.2019 a 15.2.2019`). Rejeita períodos invertidos.
pub fn periodo(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let caps = RE_PERIODO.captures(text)?;
    let date_at = |i: usize| -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            caps[i + 2].parse().ok()?,
            caps[i + 1].parse().ok()?,
            caps[i].parse().ok()?,
        )
    };
    let start = date_at(1)?;
    let end = date_at(4)?;
    (start <= end).then_some((start, end))
}

/// Nome do mês em português (com ou sem acento) ou número 1–12.
pub fn month_number(name: &str) -> Option<u32> {
    if let Ok(n) = name.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let folded = name.to_lowercase().replace('ç', "c");
    MONTHS
        .iter()
        .position(|m| *m == folded)
        .map(|i| i as u32 + 1)
}

/// Case-insensitive matcher over a list of configured keywords.
///
/// `substrings` matches anywhere in the text; `words` requires word boundaries
/// around each keyword. An empty list never matches.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    regex: Option<Regex>,
}

impl KeywordMatcher {
    pub fn substrings<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        Self::build(keywords, false)
    }

    pub fn words<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        Self::build(keywords, true)
    }

    fn build<S: AsRef<str>>(keywords: &[S], words: bool) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }
        let body = alternatives.join("|");
        let pattern = if words {
            format!(r"(?i)\b(?:{body})\b")
        } else {
            format!(r"(?i)(?:{body})")
        };
        Ok(Self {
            regex: Some(Regex::new(&pattern)?),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Byte offset of the earliest keyword occurrence.
    pub fn earliest(&self, text: &str) -> Option<usize> {
        self.regex.as_ref()?.find(text).map(|m| m.start())
    }
}
