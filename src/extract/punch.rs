//! Marcações de ponto e a validação dos pares entrada/saída.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Uma posição do vetor de marcações.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Punch {
    /// Sem marcação. Exportado como `0`.
    #[default]
    Absent,
    At(NaiveTime),
    /// Saída à meia-noite (`00:00` no documento), exportada como `24:00`.
    EndOfDay,
}

impl Punch {
    /// Converts a recognized time token; midnight becomes [`Punch::EndOfDay`].
    pub fn from_time(t: NaiveTime) -> Self {
        if t.hour() == 0 && t.minute() == 0 {
            Punch::EndOfDay
        } else {
            Punch::At(t)
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Punch::Absent)
    }
}

impl fmt::Display for Punch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Punch::Absent => f.write_str("0"),
            Punch::At(t) => write!(f, "{}", t.format("%H:%M")),
            Punch::EndOfDay => f.write_str("24:00"),
        }
    }
}

impl Serialize for Punch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Quatro posições: entrada1, saida1, entrada2, saida2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PunchVector(pub [Punch; 4]);

impl PunchVector {
    pub const ABSENT: PunchVector = PunchVector([Punch::Absent; 4]);

    /// Fills slots left to right, ignoring anything past the fourth value.
    pub fn from_punches(punches: impl IntoIterator<Item = Punch>) -> Self {
        let mut slots = [Punch::Absent; 4];
        for (slot, p) in slots.iter_mut().zip(punches) {
            *slot = p;
        }
        PunchVector(slots)
    }

    pub fn entrada1(&self) -> Punch {
        self.0[0]
    }

    pub fn saida1(&self) -> Punch {
        self.0[1]
    }

    pub fn entrada2(&self) -> Punch {
        self.0[2]
    }

    pub fn saida2(&self) -> Punch {
        self.0[3]
    }

    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_present()).count()
    }

    /// Applies the pairing rules.
    ///
    /// A single isolated punch clears the whole day. Otherwise, per pair, an
    /// entrance without exit clears both slots and an exit without entrance
    /// clears the exit.
    pub fn validate(self) -> Self {
        if self.present_count() == 1 {
            return Self::ABSENT;
        }
        let mut slots = self.0;
        for pair in slots.chunks_exact_mut(2) {
            match (pair[0].is_present(), pair[1].is_present()) {
                (true, false) => {
                    pair[0] = Punch::Absent;
                    pair[1] = Punch::Absent;
                }
                (false, true) => pair[1] = Punch::Absent,
                _ => {}
            }
        }
        PunchVector(slots)
    }

    /// Every pair is either complete or empty.
    pub fn is_paired(&self) -> bool {
        self.0
            .chunks_exact(2)
            .all(|pair| pair[0].is_present() == pair[1].is_present())
    }
}

impl fmt::Display for PunchVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Punch {
        match s {
            "0" => Punch::Absent,
            "24:00" => Punch::EndOfDay,
            _ => Punch::At(NaiveTime::parse_from_str(s, "%H:%M").unwrap()),
        }
    }

    fn v(slots: [&str; 4]) -> PunchVector {
        PunchVector(slots.map(p))
    }

    #[test]
    fn single_punch_in_any_slot_clears_day() {
        for i in 0..4 {
            let mut slots = ["0"; 4];
            slots[i] = "08:00";
            assert_eq!(v(slots).validate(), PunchVector::ABSENT, "slot {i}");
        }
        assert_eq!(v(["0", "0", "24:00", "0"]).validate(), PunchVector::ABSENT);
    }

    #[test]
    fn lone_entrance_clears_day() {
        assert_eq!(v(["08:00", "0", "0", "0"]).validate(), v(["0", "0", "0", "0"]));
    }

    #[test]
    fn complete_day_is_untouched() {
        let day = v(["08:00", "12:00", "13:00", "17:00"]);
        assert_eq!(day.validate(), day);
        let two = v(["08:00", "12:00", "0", "0"]);
        assert_eq!(two.validate(), two);
    }

    #[test]
    fn lone_exit_clears_day() {
        assert_eq!(v(["0", "12:00", "0", "0"]).validate(), PunchVector::ABSENT);
    }

    #[test]
    fn orphan_exit_zeroes_only_the_exit() {
        // Empirically tuned rule: only the exit is cleared. With an absent
        // entrance this is indistinguishable from clearing the pair.
        assert_eq!(
            v(["0", "12:00", "13:00", "17:00"]).validate(),
            v(["0", "0", "13:00", "17:00"])
        );
    }

    #[test]
    fn orphan_entrance_zeroes_the_pair() {
        assert_eq!(
            v(["08:00", "12:00", "13:00", "0"]).validate(),
            v(["08:00", "12:00", "0", "0"])
        );
        assert_eq!(
            v(["08:00", "0", "13:00", "17:00"]).validate(),
            v(["0", "0", "13:00", "17:00"])
        );
    }

    #[test]
    fn validated_vectors_are_paired() {
        let cases = [
            ["08:00", "12:00", "13:00", "17:00"],
            ["08:00", "0", "0", "17:00"],
            ["0", "12:00", "13:00", "0"],
            ["08:00", "12:00", "0", "24:00"],
        ];
        for case in cases {
            assert!(v(case).validate().is_paired(), "{case:?}");
        }
    }

    #[test]
    fn validate_is_idempotent() {
        let once = v(["08:00", "0", "13:00", "24:00"]).validate();
        assert_eq!(once.validate(), once);
    }

    #[test]
    fn from_time_maps_midnight() {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Punch::from_time(midnight), Punch::EndOfDay);
        assert_eq!(Punch::from_time(midnight).to_string(), "24:00");
        assert_eq!(p("07:05").to_string(), "07:05");
        assert_eq!(Punch::Absent.to_string(), "0");
    }

    #[test]
    fn from_punches_pads_and_truncates() {
        let v = PunchVector::from_punches([p("08:00")]);
        assert_eq!(v.to_string(), "[08:00, 0, 0, 0]");
        let v = PunchVector::from_punches(["01:00", "02:00", "03:00", "04:00", "05:00"].map(p));
        assert_eq!(v.saida2(), p("04:00"));
    }

    #[test]
    fn serializes_as_strings() {
        let json = serde_json::to_string(&v(["08:00", "12:00", "0", "24:00"])).unwrap();
        assert_eq!(json, r#"["08:00","12:00","0","24:00"]"#);
    }
}
