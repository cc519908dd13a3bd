use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, RangeInclusive, Sub};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A monetary amount in integer cents.
///
/// Every amount in the engine is fixed-point, so repeated sums never drift
/// the way binary floats do. Conversions from text and floats round to
/// 2 decimal places (half away from zero).
///
/// Arithmetic saturates at the `i64` limits. Parsed amounts are bounded by
/// [`Cents::MAX_AMOUNT`], so a saturated sum always lies beyond any window a
/// caller can express.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Largest magnitude accepted from text or floats: 10^13 whole units.
    pub const MAX_AMOUNT: Cents = Cents(1_000_000_000_000_000);

    /// `None` for NaN, infinities and anything beyond [`Cents::MAX_AMOUNT`].
    pub fn try_from_f64(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        if cents.is_finite() && cents.abs() <= Self::MAX_AMOUNT.0 as f64 {
            Some(Self(cents as i64))
        } else {
            None
        }
    }

    /// Like [`Cents::try_from_f64`] but clamps out-of-range values to
    /// `±MAX_AMOUNT`; NaN becomes zero.
    pub fn from_f64(value: f64) -> Self {
        match Self::try_from_f64(value) {
            Some(cents) => cents,
            None if value.is_nan() => Self::ZERO,
            None if value < 0.0 => -Self::MAX_AMOUNT,
            None => Self::MAX_AMOUNT,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Parse a plain decimal (`1234.5`, `-0.125`, `+7`) without going through
    /// a float. Digits past the second decimal place round half away from
    /// zero. Exponent notation falls back to float parsing. Magnitudes above
    /// [`Cents::MAX_AMOUNT`] are rejected.
    pub fn parse(text: &str) -> Result<Self, ReconError> {
        let err = || ReconError::AmountParse { value: text.to_string() };
        let s = text.trim();

        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return s
                .parse::<f64>()
                .ok()
                .and_then(Self::try_from_f64)
                .ok_or_else(err);
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err())?
        };
        let frac = frac.as_bytes();
        let digit = |i: usize| frac.get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);

        let mut cents = whole_units
            .checked_mul(100)
            .and_then(|c| c.checked_add(digit(0) * 10 + digit(1)))
            .ok_or_else(err)?;
        if digit(2) >= 5 {
            cents = cents.checked_add(1).ok_or_else(err)?;
        }
        if cents > Self::MAX_AMOUNT.0 {
            return Err(err());
        }

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        *self = *self + rhs;
    }
}

impl Sub for Cents {
    type Output = Cents;
    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Cents {
    type Output = Cents;
    fn neg(self) -> Cents {
        Cents(self.0.saturating_neg())
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Cents {
        iter.copied().sum()
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `"12.50"`, `12.5` or `12` (whole units).
impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(units) => units
                .checked_mul(100)
                .filter(|c| c.abs() <= Cents::MAX_AMOUNT.0)
                .map(Cents)
                .ok_or_else(|| de::Error::custom("amount out of range")),
            Raw::Float(v) => {
                Cents::try_from_f64(v).ok_or_else(|| de::Error::custom("amount out of range"))
            }
            Raw::Text(s) => Cents::parse(&s).map_err(de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Closed interval `[target - tolerance, target + tolerance]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub lower: Cents,
    pub upper: Cents,
}

impl Window {
    /// Negative tolerance is treated as its absolute value.
    pub fn around(target: Cents, tolerance: Cents) -> Self {
        let tolerance = tolerance.abs();
        Self {
            lower: target - tolerance,
            upper: target + tolerance,
        }
    }

    pub fn contains(&self, sum: Cents) -> bool {
        self.lower <= sum && sum <= self.upper
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Where an item came from. Stable for the lifetime of a search so callers
/// can map results back to their source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    /// 0-based index into manually entered values.
    Line { index: usize },
    /// Spreadsheet-style cell, 1-based row.
    Cell { row: u32, column: String },
}

impl Position {
    pub fn line(index: usize) -> Self {
        Self::Line { index }
    }

    pub fn cell(row: u32, column: impl Into<String>) -> Self {
        Self::Cell { row, column: column.into() }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Line { index: a }, Self::Line { index: b }) => a.cmp(b),
            (Self::Line { .. }, Self::Cell { .. }) => Ordering::Less,
            (Self::Cell { .. }, Self::Line { .. }) => Ordering::Greater,
            (
                Self::Cell { row: ra, column: ca },
                Self::Cell { row: rb, column: cb },
            ) => ra
                .cmp(rb)
                .then_with(|| ca.len().cmp(&cb.len()))
                .then_with(|| ca.cmp(cb)),
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { index } => write!(f, "#{}", index + 1),
            Self::Cell { row, column } => write!(f, "{column}{row}"),
        }
    }
}

/// A single candidate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub value: Cents,
    pub position: Position,
    /// Already committed to a finalized combination. Owned by the caller;
    /// the search engine only reads it.
    #[serde(default)]
    pub consumed: bool,
}

impl Item {
    pub fn new(value: Cents, position: Position) -> Self {
        Self { value, position, consumed: false }
    }

    pub fn from_f64(value: f64, position: Position) -> Self {
        Self::new(Cents::from_f64(value), position)
    }
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// An accepted subset. Sum and difference are computed once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CombinationRepr")]
pub struct Combination {
    items: Vec<Item>,
    target: Cents,
    sum: Cents,
    difference: Cents,
    size: usize,
}

#[derive(Deserialize)]
struct CombinationRepr {
    items: Vec<Item>,
    target: Cents,
}

impl From<CombinationRepr> for Combination {
    fn from(repr: CombinationRepr) -> Self {
        Combination::new(repr.items, repr.target)
    }
}

impl Combination {
    pub fn new(items: Vec<Item>, target: Cents) -> Self {
        let sum: Cents = items.iter().map(|i| i.value).sum();
        Self {
            size: items.len(),
            difference: sum - target,
            items,
            target,
            sum,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn target(&self) -> Cents {
        self.target
    }

    pub fn sum(&self) -> Cents {
        self.sum
    }

    /// `sum - target`, signed.
    pub fn difference(&self) -> Cents {
        self.difference
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.items.iter().map(|i| &i.position)
    }

    pub fn items_in_original_order(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_by(|a, b| a.position.cmp(&b.position));
        items
    }

    /// `+0.00` / `-1.25`
    pub fn difference_display(&self) -> String {
        if self.difference >= Cents::ZERO {
            format!("+{}", self.difference)
        } else {
            self.difference.to_string()
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.items.iter().map(|i| i.value.to_string()).collect();
        write!(
            f,
            "[{}] = {} ({})",
            values.join(", "),
            self.sum,
            self.difference_display()
        )
    }
}

// ---------------------------------------------------------------------------
// Bounds + Results
// ---------------------------------------------------------------------------

/// What the bounds estimator pruned from the requested size range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundsReport {
    pub requested_min: usize,
    pub requested_max: usize,
    pub effective_min: usize,
    pub effective_max: usize,
    pub skipped_sizes: BTreeSet<usize>,
    pub infeasible: bool,
}

impl BoundsReport {
    /// Sizes the enumerator will walk. Empty when infeasible.
    pub fn sizes(&self) -> RangeInclusive<usize> {
        self.effective_min..=self.effective_max
    }
}

/// Periodic progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub size: usize,
    pub checked: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub combinations: Vec<Combination>,
    pub target: Cents,
    pub tolerance: Cents,
    pub min_size: usize,
    pub max_size: usize,
    pub max_results: usize,
    /// Every match seen, including those past the cap.
    pub total_found: u64,
    pub total_checked: u64,
    pub cancelled: bool,
    pub bounds: BoundsReport,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// More matches exist than were kept.
    pub fn truncated(&self) -> bool {
        self.total_found > self.combinations.len() as u64
    }
}

/// Completion signal of a streamed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub total_found: u64,
    pub total_checked: u64,
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
