use chrono::NaiveDate;

use super::model::{Dataset, FilterCriteria, Record};

// ---------------------------------------------------------------------------
// Filter predicate: category equality + inclusive date range
// ---------------------------------------------------------------------------

/// Return the records matching `criteria`, in dataset order.
///
/// A record passes when:
/// * `creation_role` equals the selected category exactly, and
/// * `start_date <= open_date <= end_date`.
///
/// No match yields an empty vector. An inverted range matches nothing.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|rec| {
            rec.creation_role == criteria.category && criteria.contains_date(rec.open_date)
        })
        .collect()
}

/// [`filter`] for a category and range given separately; used when
/// sweeping every category over one date range.
pub fn filter_by<'a>(
    dataset: &'a Dataset,
    category: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<&'a Record> {
    let criteria = FilterCriteria {
        category: category.to_string(),
        start_date,
        end_date,
    };
    filter(dataset, &criteria)
}
