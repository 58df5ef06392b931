// Outcome-slot allocator.
//
// One linear pass: every category claims its slots from a single cursor that
// only moves forward, so ranges come out disjoint and in card order. Nothing
// is retried or backtracked; missing inputs yield an empty layout.

use super::{FieldZone, SlotCategory, SlotLayout, SlotRange, FIRST_HIT_SLOT};
use crate::diagnostics::Diagnostic;
use crate::ratings::PowerHandClass;
use crate::stats::{Handedness, HittingStats};
use tracing::{debug, warn};

/// Plate appearances the eval factor is measured against.
pub const REFERENCE_PLATE_APPEARANCES: f64 = 128.0;

/// Subtracted from scaled singles: the first table positions belong to
/// outcomes outside this card section.
const SINGLES_OFFSET: f64 = 11.0;

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

/// `plate_appearances / 128`.
pub fn eval_factor(plate_appearances: u32) -> f64 {
    f64::from(plate_appearances) / REFERENCE_PLATE_APPEARANCES
}

/// Scale a raw count, rounding half away from zero.
pub fn scale_count(raw: u32, factor: f64) -> u32 {
    (f64::from(raw) * factor).round() as u32
}

/// Scaled singles after the table offset. May be zero or negative for light
/// hitters, in which case no single slots are funded.
fn scale_singles(singles: i64, factor: f64) -> i64 {
    (singles as f64 * factor - SINGLES_OFFSET).round() as i64
}

// ---------------------------------------------------------------------------
// Pull side
// ---------------------------------------------------------------------------

/// Field a batter pulls toward. Right-handed batters pull to left field,
/// left-handed batters to right field. Switch hitters and pitchers spray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullSide {
    LeftField,
    RightField,
    Spray,
}

impl PullSide {
    pub fn from_power_hand(class: Option<&PowerHandClass>) -> Self {
        match class.and_then(PowerHandClass::batting_side) {
            Some(Handedness::Right) => PullSide::LeftField,
            Some(Handedness::Left) => PullSide::RightField,
            Some(Handedness::Switch) | None => PullSide::Spray,
        }
    }

    /// Split `total` outcomes across the three outfield zones, in slot
    /// allocation order.
    ///
    /// Pull hitters put their pull field first and give it the remainder, so
    /// the pull zone always holds the lowest slots and at least as many as
    /// any other zone. Spray hitters go left to right and hand the remainder
    /// out one at a time, center first.
    pub fn split(self, total: u32) -> [(FieldZone, u32); 3] {
        let share = total / 3;
        let remainder = total % 3;
        match self {
            PullSide::LeftField => [
                (FieldZone::LeftField, share + remainder),
                (FieldZone::CenterField, share),
                (FieldZone::RightField, share),
            ],
            PullSide::RightField => [
                (FieldZone::RightField, share + remainder),
                (FieldZone::CenterField, share),
                (FieldZone::LeftField, share),
            ],
            PullSide::Spray => [
                (FieldZone::LeftField, share + u32::from(remainder >= 2)),
                (FieldZone::CenterField, share + u32::from(remainder >= 1)),
                (FieldZone::RightField, share),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct SlotCursor {
    next: u32,
    /// Set once a claim no longer fits in the slot number space; later
    /// claims are dropped.
    exhausted: bool,
    layout: SlotLayout,
}

impl SlotCursor {
    fn new() -> Self {
        SlotCursor {
            next: FIRST_HIT_SLOT,
            exhausted: false,
            layout: SlotLayout::default(),
        }
    }

    /// Reserve `count` consecutive slots. Zero claims nothing and leaves the
    /// category out of the layout.
    fn claim(&mut self, category: SlotCategory, count: u32) {
        if count == 0 || self.exhausted {
            return;
        }
        let Some(range) = SlotRange::spanning(self.next, count) else {
            warn!("{count} {category} slots from {} overrun the slot space", self.next);
            self.exhausted = true;
            return;
        };
        self.layout.insert(category, range);
        match range.last.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
    }

    fn claim_zones(&mut self, zones: [(FieldZone, u32); 3], category: fn(FieldZone) -> SlotCategory) {
        for (zone, count) in zones {
            self.claim(category(zone), count);
        }
    }

    /// Highest slot claimed so far, saturating at `u32::MAX` once exhausted.
    fn last_claimed(&self) -> u32 {
        if self.exhausted {
            u32::MAX
        } else {
            self.next - 1
        }
    }

    /// Generic outs take whatever is left up to `max_slot`.
    fn fill_outs(&mut self, max_slot: u32, notes: &mut Vec<Diagnostic>) {
        if !self.exhausted && self.next <= max_slot {
            self.claim(SlotCategory::Out, max_slot - self.next + 1);
            return;
        }
        let last_slot = self.last_claimed();
        if last_slot > max_slot {
            warn!("funded slots run to {last_slot}, past table maximum {max_slot}");
            notes.push(Diagnostic::TableOverflow { last_slot, max_slot });
        }
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Build the slot layout for a hitting line.
///
/// Requires a hitting line with plate appearances > 0; otherwise returns an
/// empty layout and records why. Categories are funded in card order:
/// infield single, single zones, double zones, triple, home run, strikeout,
/// walk, hit-by-pitch, then generic outs up to `max_slot`.
pub fn allocate_slots(
    hitting: Option<&HittingStats>,
    power_hand: Option<&PowerHandClass>,
    max_slot: u32,
    notes: &mut Vec<Diagnostic>,
) -> SlotLayout {
    let Some(hitting) = hitting else {
        debug!("no hitting stats, no hitting card will be made");
        notes.push(Diagnostic::PreconditionNotMet("no hitting stats".into()));
        return SlotLayout::default();
    };
    let plate_appearances = match hitting.plate_appearances {
        Some(pa) if pa > 0 => pa,
        _ => {
            warn!("0 plate appearances, no hitting card will be made");
            notes.push(Diagnostic::PreconditionNotMet("no plate appearances".into()));
            return SlotLayout::default();
        }
    };

    let factor = eval_factor(plate_appearances);
    let pull = PullSide::from_power_hand(power_hand);
    let mut cursor = SlotCursor::new();

    // Singles come from raw counts, then scale with the table offset.
    let singles = i64::from(hitting.hits) - i64::from(hitting.extra_base_hits());
    let mut singles_num = scale_singles(singles, factor);

    // At least two singles are needed before one becomes an infield single.
    if singles_num > 1 {
        cursor.claim(SlotCategory::InfieldSingle, 1);
        singles_num -= 1;
    }
    // Negative means no singles; past u32 saturates and overflows the table.
    let singles_num = u32::try_from(singles_num.max(0)).unwrap_or(u32::MAX);
    cursor.claim_zones(pull.split(singles_num), SlotCategory::single);

    let doubles_num = scale_count(hitting.doubles, factor);
    cursor.claim_zones(pull.split(doubles_num), SlotCategory::double);

    cursor.claim(SlotCategory::Triple8, scale_count(hitting.triples, factor));
    cursor.claim(SlotCategory::HomeRun, scale_count(hitting.home_runs, factor));
    cursor.claim(SlotCategory::Strikeout, scale_count(hitting.strike_outs, factor));
    cursor.claim(SlotCategory::Walk, scale_count(hitting.total_walks(), factor));
    cursor.claim(SlotCategory::HitByPitch, scale_count(hitting.hit_by_pitch, factor));
    cursor.fill_outs(max_slot, notes);

    debug!(
        "allocated {} categories through slot {}",
        cursor.layout.len(),
        cursor.last_claimed()
    );
    cursor.layout
}
