use std::ops::Range;

use super::CompiledSignature;
use crate::parse;

/// Faixa `[start, end)` de linhas de uma página que contém as linhas da tabela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRegion {
    pub start: usize,
    pub end: usize,
}

impl RowRegion {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end.max(self.start)
    }
}

/// Locates the table rows inside a page.
///
/// Returns `None` when the layout's header cannot be found at all. A header
/// keyword line starts the region on the following line; when only the
/// loose row pattern matches, the matched line is itself the first row. A
/// signature without header sets spans the whole page. The region ends at
/// the first non-blank line containing a footer keyword, or at the end of
/// the page.
pub fn locate<S: AsRef<str>>(lines: &[S], sig: &CompiledSignature) -> Option<RowRegion> {
    let start = if sig.header_sets.is_empty() {
        0
    } else {
        find_header(lines, sig)
            .map(|i| i + 1)
            .or_else(|| find_loose_row(lines, sig))?
    };

    let end = lines
        .iter()
        .enumerate()
        .skip(start)
        .map(|(i, l)| (i, l.as_ref()))
        .find(|(_, l)| !l.trim().is_empty() && sig.footer.is_match(l))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    Some(RowRegion { start, end })
}

fn find_header<S: AsRef<str>>(lines: &[S], sig: &CompiledSignature) -> Option<usize> {
    lines.iter().position(|line| {
        let line = line.as_ref();
        sig.header_sets
            .iter()
            .any(|set| set.iter().all(|token| token.is_match(line)))
    })
}

fn find_loose_row<S: AsRef<str>>(lines: &[S], sig: &CompiledSignature) -> Option<usize> {
    lines.iter().position(|line| {
        let line = line.as_ref();
        parse::looks_like_row_start(line)
            && (parse::has_time_like(line) || sig.special_days.is_match(line))
    })
}
