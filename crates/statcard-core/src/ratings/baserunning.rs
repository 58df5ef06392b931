// On-base aggressiveness (OBR) and speed ratings.

use super::Grade;
use crate::diagnostics::Diagnostic;
use crate::stats::HittingStats;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// On-base aggressiveness
// ---------------------------------------------------------------------------

/// Runs scored per time on base. Zero times on base resolves to 0.0.
pub fn scoring_rate(hitting: &HittingStats, notes: &mut Vec<Diagnostic>) -> f64 {
    let times_on_base = hitting.times_on_base();
    if times_on_base == 0 {
        debug!("zero times on base, scoring rate forced to 0");
        notes.push(Diagnostic::ArithmeticDegeneracy {
            what: "scoring rate (zero times on base)".into(),
            resolved: "0.0".into(),
        });
        return 0.0;
    }
    f64::from(hitting.runs) / f64::from(times_on_base)
}

/// Map a scoring rate to a grade. Thresholds are exclusive lower bounds, so a
/// rate sitting exactly on a threshold takes the worse grade.
pub fn grade_scoring_rate(rate: f64) -> Grade {
    if rate > 0.45 {
        Grade::A
    } else if rate > 0.35 {
        Grade::B
    } else if rate > 0.25 {
        Grade::C
    } else if rate > 0.15 {
        Grade::D
    } else {
        Grade::E
    }
}

/// OBR grade. Without a hitting line the scoring rate is 0, which grades E.
pub fn on_base_aggressiveness(hitting: Option<&HittingStats>, notes: &mut Vec<Diagnostic>) -> Grade {
    let rate = hitting.map_or(0.0, |h| scoring_rate(h, notes));
    grade_scoring_rate(rate)
}

// ---------------------------------------------------------------------------
// Speed
// ---------------------------------------------------------------------------

/// Map a stolen-base percentage to a grade. Thresholds are inclusive lower
/// bounds: 0.7 is an A.
pub fn grade_steal_percentage(pct: f64) -> Grade {
    if pct >= 0.7 {
        Grade::A
    } else if pct >= 0.5 {
        Grade::B
    } else if pct >= 0.3 {
        Grade::C
    } else if pct >= 0.1 {
        Grade::D
    } else {
        Grade::E
    }
}

fn steal_percentage(hitting: &HittingStats, notes: &mut Vec<Diagnostic>) -> f64 {
    let Some(raw) = hitting.stolen_base_percentage.as_ref() else {
        return 0.0;
    };
    match raw.parse() {
        Some(pct) => pct,
        None => {
            warn!("unparsable stolenBasePercentage {:?}, using 0.0", raw.raw());
            notes.push(Diagnostic::malformed(
                "hitting.stolenBasePercentage",
                &raw.raw(),
                "0.0",
            ));
            0.0
        }
    }
}

/// Speed grade, or `None` when there is no hitting line.
pub fn speed(hitting: Option<&HittingStats>, notes: &mut Vec<Diagnostic>) -> Option<Grade> {
    let hitting = hitting?;
    Some(grade_steal_percentage(steal_percentage(hitting, notes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RateValue;

    fn hitting_with_steals(pct: RateValue) -> HittingStats {
        HittingStats {
            stolen_base_percentage: Some(pct),
            ..Default::default()
        }
    }

    #[test]
    fn scoring_rate_thresholds_are_exclusive() {
        assert_eq!(grade_scoring_rate(0.46), Grade::A);
        assert_eq!(grade_scoring_rate(0.45), Grade::B);
        assert_eq!(grade_scoring_rate(0.35), Grade::C);
        assert_eq!(grade_scoring_rate(0.25), Grade::D);
        assert_eq!(grade_scoring_rate(0.15), Grade::E);
        assert_eq!(grade_scoring_rate(0.0), Grade::E);
    }

    #[test]
    fn zero_times_on_base_grades_e() {
        let hitting = HittingStats {
            runs: 3,
            ..Default::default()
        };
        let mut notes = Vec::new();
        assert_eq!(scoring_rate(&hitting, &mut notes), 0.0);
        assert_eq!(on_base_aggressiveness(Some(&hitting), &mut notes), Grade::E);
        assert!(matches!(notes[0], Diagnostic::ArithmeticDegeneracy { .. }));
    }

    #[test]
    fn times_on_base_counts_every_way_aboard() {
        let hitting = HittingStats {
            hits: 10,
            base_on_balls: Some(5),
            hit_by_pitch: 3,
            intentional_walks: 2,
            runs: 10,
            ..Default::default()
        };
        let mut notes = Vec::new();
        assert!((scoring_rate(&hitting, &mut notes) - 0.5).abs() < f64::EPSILON);
        assert_eq!(on_base_aggressiveness(Some(&hitting), &mut notes), Grade::A);
    }

    #[test]
    fn missing_hitting_line_grades_e() {
        let mut notes = Vec::new();
        assert_eq!(on_base_aggressiveness(None, &mut notes), Grade::E);
        assert!(notes.is_empty());
    }

    #[test]
    fn steal_boundaries_take_higher_grade() {
        assert_eq!(grade_steal_percentage(0.7), Grade::A);
        assert_eq!(grade_steal_percentage(0.69), Grade::B);
        assert_eq!(grade_steal_percentage(0.5), Grade::B);
        assert_eq!(grade_steal_percentage(0.3), Grade::C);
        assert_eq!(grade_steal_percentage(0.1), Grade::D);
        assert_eq!(grade_steal_percentage(0.09), Grade::E);
    }

    #[test]
    fn speed_grade_never_improves_as_percentage_falls() {
        let mut previous = Grade::A;
        for step in (0..=100).rev() {
            let grade = grade_steal_percentage(f64::from(step) / 100.0);
            assert!(grade >= previous, "grade improved at {step}%");
            previous = grade;
        }
    }

    #[test]
    fn speed_from_text_percentage() {
        let mut notes = Vec::new();
        let hitting = hitting_with_steals(RateValue::Text(".750".into()));
        assert_eq!(speed(Some(&hitting), &mut notes), Some(Grade::A));
        assert!(notes.is_empty());
    }

    #[test]
    fn malformed_percentage_falls_back_to_zero() {
        let mut notes = Vec::new();
        let hitting = hitting_with_steals(RateValue::Text("-.--".into()));
        assert_eq!(speed(Some(&hitting), &mut notes), Some(Grade::E));
        assert_eq!(notes.len(), 1);
        assert!(matches!(notes[0], Diagnostic::MalformedValue { .. }));
    }

    #[test]
    fn missing_percentage_is_zero_without_note() {
        let mut notes = Vec::new();
        assert_eq!(
            speed(Some(&HittingStats::default()), &mut notes),
            Some(Grade::E)
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn no_hitting_line_means_unknown_speed() {
        let mut notes = Vec::new();
        assert_eq!(speed(None, &mut notes), None);
    }
}
