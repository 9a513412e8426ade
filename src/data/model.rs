use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Record – one row of the call log
// ---------------------------------------------------------------------------

/// A single call-log entry (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Creator role ("Papel do criador"), the category dimension.
    pub creation_role: String,
    /// Day the case was opened. Any time-of-day in the source is dropped.
    pub open_date: NaiveDate,
    /// Remaining columns as raw text: column_name → value.
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
impl Record {
    pub fn new(creation_role: impl Into<String>, open_date: NaiveDate) -> Self {
        Self {
            creation_role: creation_role.into(),
            open_date,
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded call log
// ---------------------------------------------------------------------------

/// The full parsed call log with pre-computed indices.
///
/// Immutable once built; a reload replaces the whole value.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records in source order.
    pub records: Vec<Record>,
    /// Distinct creator roles in order of first appearance.
    pub categories: Vec<String>,
    /// Names of the passthrough columns (everything but category and date).
    pub extra_columns: Vec<String>,
    /// Earliest and latest `open_date`, `None` when there are no records.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build category and date indices from the loaded records.
    pub fn from_records(records: Vec<Record>, extra_columns: Vec<String>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut categories = Vec::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if seen.insert(rec.creation_role.as_str()) {
                categories.push(rec.creation_role.clone());
            }
            date_bounds = Some(match date_bounds {
                None => (rec.open_date, rec.open_date),
                Some((lo, hi)) => (lo.min(rec.open_date), hi.max(rec.open_date)),
            });
        }

        Dataset {
            records,
            categories,
            extra_columns,
            date_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Default criteria for a fresh session: first category, full date range.
    pub fn default_criteria(&self) -> Option<FilterCriteria> {
        let category = self.categories.first()?.clone();
        let (start_date, end_date) = self.date_bounds?;
        Some(FilterCriteria {
            category,
            start_date,
            end_date,
        })
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – one user selection
// ---------------------------------------------------------------------------

/// Selected category plus an inclusive `[start_date, end_date]` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FilterCriteria {
    /// Inclusive at both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// ---------------------------------------------------------------------------
// MonthlySeries – counts per calendar month
// ---------------------------------------------------------------------------

/// Calendar-month bucket key. Orders chronologically (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One entry of a [`MonthlySeries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: MonthKey,
    /// Display label, e.g. `"Fev 2024"`.
    pub label: String,
    pub count: u64,
}

/// Chronologically ascending month counts. Months without records are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub entries: Vec<MonthCount>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.count).collect()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

// ---------------------------------------------------------------------------
// SummaryMetrics
// ---------------------------------------------------------------------------

/// First-to-last relative change of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Variation {
    /// Percentage, always finite.
    Percent(f64),
    /// The first month had a zero count.
    Undefined,
}

impl Variation {
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Variation::Percent(p) => Some(*p),
            Variation::Undefined => None,
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Percent(p) => write!(f, "{p:.2}%"),
            Variation::Undefined => write!(f, "n/d"),
        }
    }
}

/// Scalar summaries of one [`MonthlySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub variation_pct: Variation,
    pub min_volume: u64,
    pub max_volume: u64,
    pub total_volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let ds = Dataset::from_records(
            vec![
                Record::new("Assistente CSF CM", d(2024, 2, 1)),
                Record::new("Assistente CSF", d(2023, 11, 5)),
                Record::new("Assistente CSF CM", d(2024, 3, 9)),
            ],
            Vec::new(),
        );
        assert_eq!(ds.categories, vec!["Assistente CSF CM", "Assistente CSF"]);
        assert_eq!(ds.date_bounds, Some((d(2023, 11, 5), d(2024, 3, 9))));
    }

    #[test]
    fn default_criteria_spans_full_range() {
        let ds = Dataset::from_records(
            vec![
                Record::new("A", d(2024, 5, 2)),
                Record::new("B", d(2024, 1, 31)),
            ],
            Vec::new(),
        );
        let crit = ds.default_criteria().unwrap();
        assert_eq!(crit.category, "A");
        assert_eq!(crit.start_date, d(2024, 1, 31));
        assert_eq!(crit.end_date, d(2024, 5, 2));
    }

    #[test]
    fn empty_dataset_has_no_default_criteria() {
        let ds = Dataset::from_records(Vec::new(), Vec::new());
        assert!(ds.is_empty());
        assert!(ds.default_criteria().is_none());
    }

    #[test]
    fn month_keys_order_across_years() {
        assert!(MonthKey::of(d(2023, 12, 31)) < MonthKey::of(d(2024, 1, 1)));
        assert_eq!(MonthKey::of(d(2024, 3, 15)).to_string(), "2024-03");
    }

    #[test]
    fn variation_display() {
        assert_eq!(Variation::Percent(-33.333).to_string(), "-33.33%");
        assert_eq!(Variation::Undefined.to_string(), "n/d");
    }
}
