use super::punch::{Punch, PunchVector};
use crate::layout::CompiledSignature;
use crate::parse;

/// Pulls the raw (unvalidated) punch vector out of one date's text.
///
/// Special days yield an empty vector. Otherwise the text is cut at the
/// first non-punch column label and the first four valid times are kept.
pub fn extract_punches(raw: &str, sig: &CompiledSignature) -> PunchVector {
    if sig.special_days.is_match(raw) {
        return PunchVector::ABSENT;
    }
    let cut = sig.non_punch.earliest(raw).unwrap_or(raw.len());
    PunchVector::from_punches(parse::times(&raw[..cut]).take(4).map(Punch::from_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutSignature, LayoutVariant};

    fn jornada() -> CompiledSignature {
        LayoutSignature::builtin(LayoutVariant::Jornada).compile().unwrap()
    }

    #[test]
    fn takes_first_four_times() {
        let v = extract_punches(" Seg 07:58 12:00 13:00 17:02 18:00", &jornada());
        assert_eq!(v.to_string(), "[07:58, 12:00, 13:00, 17:02]");
    }

    #[test]
    fn cuts_at_non_punch_column() {
        let v = extract_punches(" Seg 07:58 12:00 H.E.50% 01:10 SALDO 08:00", &jornada());
        assert_eq!(v.to_string(), "[07:58, 12:00, 0, 0]");
    }

    #[test]
    fn cutoff_uses_earliest_keyword() {
        // AD.NOT is listed before SALDO but appears later in the text.
        let v = extract_punches(" 08:00 12:00 saldo 13:00 ad.not 17:00", &jornada());
        assert_eq!(v.to_string(), "[08:00, 12:00, 0, 0]");
    }

    #[test]
    fn special_day_clears_everything() {
        let v = extract_punches(" Sab 08:00 12:00 FOLGA", &jornada());
        assert_eq!(v, PunchVector::ABSENT);
        let v = extract_punches(" Qua Atestado médico 08:00 12:00", &jornada());
        assert_eq!(v, PunchVector::ABSENT);
    }

    #[test]
    fn midnight_becomes_end_of_day() {
        let v = extract_punches(" 18:00 00:00", &jornada());
        assert_eq!(v.to_string(), "[18:00, 24:00, 0, 0]");
    }

    #[test]
    fn ignores_invalid_times_and_empty_text() {
        let v = extract_punches(" 25:10 07:61 8:05", &jornada());
        assert_eq!(v.to_string(), "[08:05, 0, 0, 0]");
        assert_eq!(extract_punches("", &jornada()), PunchVector::ABSENT);
    }
}
