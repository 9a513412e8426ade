use std::collections::BTreeMap;

use super::model::{MonthCount, MonthKey, MonthlySeries, Record};

// ---------------------------------------------------------------------------
// Month labels
// ---------------------------------------------------------------------------

const ENGLISH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// English `%b` abbreviation → Portuguese abbreviation.
const MONTH_TRANSLATIONS: [(&str, &str); 12] = [
    ("Jan", "Jan"),
    ("Feb", "Fev"),
    ("Mar", "Mar"),
    ("Apr", "Abr"),
    ("May", "Mai"),
    ("Jun", "Jun"),
    ("Jul", "Jul"),
    ("Aug", "Ago"),
    ("Sep", "Set"),
    ("Oct", "Out"),
    ("Nov", "Nov"),
    ("Dec", "Dez"),
];

/// Translate an English month abbreviation; anything else passes through.
pub fn translate_month(abbr: &str) -> &str {
    MONTH_TRANSLATIONS
        .iter()
        .find(|(en, _)| *en == abbr)
        .map(|(_, pt)| *pt)
        .unwrap_or(abbr)
}

/// `"{abbr} {yyyy}"`, e.g. `"Fev 2024"`.
pub fn month_label(key: MonthKey) -> String {
    let english = key
        .month
        .checked_sub(1)
        .and_then(|i| ENGLISH_ABBR.get(i as usize))
        .copied()
        .unwrap_or("???");
    format!("{} {:04}", translate_month(english), key.year)
}

// ---------------------------------------------------------------------------
// Monthly aggregation
// ---------------------------------------------------------------------------

/// Count records per calendar month of `open_date`.
///
/// Only months holding at least one record are emitted; gaps are left out
/// rather than filled with zero.
pub fn aggregate<'a, I>(records: I) -> MonthlySeries
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets: BTreeMap<MonthKey, u64> = BTreeMap::new();
    for rec in records {
        *buckets.entry(MonthKey::of(rec.open_date)).or_insert(0) += 1;
    }

    let entries = buckets
        .into_iter()
        .map(|(month, count)| MonthCount {
            month,
            label: month_label(month),
            count,
        })
        .collect();

    MonthlySeries { entries }
}
