// Recoverable data-quality findings raised while deriving a card.
//
// None of these abort a derivation. They travel with the finished card and
// are tallied per batch so bad provider data shows up in the logs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// A single finding attached to a player's card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Diagnostic {
    /// An optional stat was absent and a documented fallback applied.
    #[error("missing {field}; {fallback}")]
    MissingData { field: String, fallback: String },

    /// A stat was present but unusable; a fallback constant was used instead.
    #[error("malformed {field} value {raw:?}; using {fallback}")]
    MalformedValue {
        field: String,
        raw: String,
        fallback: String,
    },

    /// Slot allocation could not run; the layout is empty.
    #[error("no hitting card: {0}")]
    PreconditionNotMet(String),

    /// A division by zero was defended and resolved to a fixed value.
    #[error("degenerate {what}; resolved to {resolved}")]
    ArithmeticDegeneracy { what: String, resolved: String },

    /// Funded outcome slots ran past the configured table size.
    #[error("slot table overflow: last assigned slot {last_slot} exceeds table maximum {max_slot}")]
    TableOverflow { last_slot: u32, max_slot: u32 },
}

/// Coarse category of a [`Diagnostic`], used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticKind {
    MissingData,
    MalformedValue,
    PreconditionNotMet,
    ArithmeticDegeneracy,
    TableOverflow,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingData => "missing_data",
            DiagnosticKind::MalformedValue => "malformed_value",
            DiagnosticKind::PreconditionNotMet => "precondition_not_met",
            DiagnosticKind::ArithmeticDegeneracy => "arithmetic_degeneracy",
            DiagnosticKind::TableOverflow => "table_overflow",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MissingData { .. } => DiagnosticKind::MissingData,
            Diagnostic::MalformedValue { .. } => DiagnosticKind::MalformedValue,
            Diagnostic::PreconditionNotMet(_) => DiagnosticKind::PreconditionNotMet,
            Diagnostic::ArithmeticDegeneracy { .. } => DiagnosticKind::ArithmeticDegeneracy,
            Diagnostic::TableOverflow { .. } => DiagnosticKind::TableOverflow,
        }
    }

    pub(crate) fn missing(field: &str, fallback: &str) -> Self {
        Diagnostic::MissingData {
            field: field.to_string(),
            fallback: fallback.to_string(),
        }
    }

    pub(crate) fn malformed(field: &str, raw: &str, fallback: &str) -> Self {
        Diagnostic::MalformedValue {
            field: field.to_string(),
            raw: raw.to_string(),
            fallback: fallback.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch tally
// ---------------------------------------------------------------------------

/// Per-batch counts of diagnostics, for data-quality monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    counts: BTreeMap<DiagnosticKind, usize>,
    players_with_findings: usize,
    players_seen: usize,
}

impl DataQualityReport {
    /// Tally one player's findings.
    pub fn record(&mut self, notes: &[Diagnostic]) {
        self.players_seen += 1;
        if !notes.is_empty() {
            self.players_with_findings += 1;
        }
        for note in notes {
            *self.counts.entry(note.kind()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn players_seen(&self) -> usize {
        self.players_seen
    }

    pub fn players_with_findings(&self) -> usize {
        self.players_with_findings
    }

    /// Emit the tally through `tracing`. Malformed values are a provider data
    /// problem and are surfaced at warn level.
    pub fn log_summary(&self) {
        info!(
            "data quality: {} findings across {}/{} players",
            self.total(),
            self.players_with_findings,
            self.players_seen
        );
        for (kind, count) in &self.counts {
            if *kind == DiagnosticKind::MalformedValue {
                warn!("data quality: {count} {kind}");
            } else {
                info!("data quality: {count} {kind}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_by_kind() {
        let mut report = DataQualityReport::default();
        report.record(&[
            Diagnostic::malformed("hitting.stolenBasePercentage", "-.--", "0.0"),
            Diagnostic::PreconditionNotMet("no plate appearances".into()),
        ]);
        report.record(&[]);
        report.record(&[Diagnostic::malformed("batSide", "X", "unknown")]);

        assert_eq!(report.count(DiagnosticKind::MalformedValue), 2);
        assert_eq!(report.count(DiagnosticKind::PreconditionNotMet), 1);
        assert_eq!(report.count(DiagnosticKind::TableOverflow), 0);
        assert_eq!(report.total(), 3);
        assert_eq!(report.players_seen(), 3);
        assert_eq!(report.players_with_findings(), 2);
    }

    #[test]
    fn display_is_readable() {
        let note = Diagnostic::malformed("hitting.stolenBasePercentage", "-.--", "0.0");
        assert_eq!(
            note.to_string(),
            "malformed hitting.stolenBasePercentage value \"-.--\"; using 0.0"
        );
        let overflow = Diagnostic::TableOverflow {
            last_slot: 120,
            max_slot: 100,
        };
        assert!(overflow.to_string().contains("exceeds table maximum 100"));
    }
}
