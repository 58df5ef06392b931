// Outcome-slot layout: which roll results map to which card outcome.
//
// Slots 1-10 of the roll table belong to outcomes outside this card section,
// so hit outcomes start at slot 11. Each outcome category owns one contiguous
// range; ranges never overlap.

pub mod allocator;

pub use allocator::{allocate_slots, eval_factor, scale_count, PullSide, REFERENCE_PLATE_APPEARANCES};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// First slot number available to card outcomes.
pub const FIRST_HIT_SLOT: u32 = 11;

// ---------------------------------------------------------------------------
// Field zones
// ---------------------------------------------------------------------------

/// Outfield direction: scorekeeping zones 7 (left), 8 (center), 9 (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldZone {
    LeftField,
    CenterField,
    RightField,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Outcome categories in card order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotCategory {
    #[serde(rename = "single_inf")]
    InfieldSingle,
    #[serde(rename = "single_7")]
    Single7,
    #[serde(rename = "single_8")]
    Single8,
    #[serde(rename = "single_9")]
    Single9,
    #[serde(rename = "double_7")]
    Double7,
    #[serde(rename = "double_8")]
    Double8,
    #[serde(rename = "double_9")]
    Double9,
    #[serde(rename = "triple_8")]
    Triple8,
    #[serde(rename = "hr")]
    HomeRun,
    #[serde(rename = "k")]
    Strikeout,
    #[serde(rename = "bb")]
    Walk,
    #[serde(rename = "hbp")]
    HitByPitch,
    #[serde(rename = "out")]
    Out,
}

impl SlotCategory {
    pub const ALL: [SlotCategory; 13] = [
        SlotCategory::InfieldSingle,
        SlotCategory::Single7,
        SlotCategory::Single8,
        SlotCategory::Single9,
        SlotCategory::Double7,
        SlotCategory::Double8,
        SlotCategory::Double9,
        SlotCategory::Triple8,
        SlotCategory::HomeRun,
        SlotCategory::Strikeout,
        SlotCategory::Walk,
        SlotCategory::HitByPitch,
        SlotCategory::Out,
    ];

    pub fn single(zone: FieldZone) -> Self {
        match zone {
            FieldZone::LeftField => SlotCategory::Single7,
            FieldZone::CenterField => SlotCategory::Single8,
            FieldZone::RightField => SlotCategory::Single9,
        }
    }

    pub fn double(zone: FieldZone) -> Self {
        match zone {
            FieldZone::LeftField => SlotCategory::Double7,
            FieldZone::CenterField => SlotCategory::Double8,
            FieldZone::RightField => SlotCategory::Double9,
        }
    }

    /// Stable key used in flat card maps and the card store.
    pub fn key(&self) -> &'static str {
        match self {
            SlotCategory::InfieldSingle => "single_inf",
            SlotCategory::Single7 => "single_7",
            SlotCategory::Single8 => "single_8",
            SlotCategory::Single9 => "single_9",
            SlotCategory::Double7 => "double_7",
            SlotCategory::Double8 => "double_8",
            SlotCategory::Double9 => "double_9",
            SlotCategory::Triple8 => "triple_8",
            SlotCategory::HomeRun => "hr",
            SlotCategory::Strikeout => "k",
            SlotCategory::Walk => "bb",
            SlotCategory::HitByPitch => "hbp",
            SlotCategory::Out => "out",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        SlotCategory::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Inclusive slot range `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    pub first: u32,
    pub last: u32,
}

impl SlotRange {
    /// Range of `count` slots starting at `first`. `None` for an empty
    /// range or one that would run past `u32::MAX`.
    pub(crate) fn spanning(first: u32, count: u32) -> Option<Self> {
        let last = first.checked_add(count.checked_sub(1)?)?;
        Some(SlotRange { first, last })
    }

    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn contains(&self, slot: u32) -> bool {
        (self.first..=self.last).contains(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

impl fmt::Display for SlotRange {
    /// "11" for a single slot, "12-179" for a span.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Finished slot layout for one player. Built once by the allocator and
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotLayout {
    ranges: BTreeMap<SlotCategory, SlotRange>,
}

impl SlotLayout {
    pub(crate) fn insert(&mut self, category: SlotCategory, range: SlotRange) {
        self.ranges.insert(category, range);
    }

    pub fn get(&self, category: SlotCategory) -> Option<SlotRange> {
        self.ranges.get(&category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Categories and ranges in card order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotCategory, SlotRange)> + '_ {
        self.ranges.iter().map(|(c, r)| (*c, *r))
    }

    /// Which outcome a roll result lands on, if any.
    pub fn outcome_for(&self, slot: u32) -> Option<SlotCategory> {
        self.iter()
            .find(|(_, range)| range.contains(slot))
            .map(|(category, _)| category)
    }

    /// Every assigned slot number, ascending.
    pub fn assigned_slots(&self) -> Vec<u32> {
        let mut slots: Vec<u32> = self.ranges.values().flat_map(SlotRange::slots).collect();
        slots.sort_unstable();
        slots
    }
}
