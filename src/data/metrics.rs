use super::model::{MonthlySeries, SummaryMetrics, Variation};

/// Summaries of one monthly series.
///
/// Returns `None` for an empty series; callers skip metrics and charts in
/// that case. A zero first-month count reports [`Variation::Undefined`].
pub fn summarize(series: &MonthlySeries) -> Option<SummaryMetrics> {
    let first = series.entries.first()?.count;
    let last = series.entries.last()?.count;

    let variation_pct = if first == 0 {
        Variation::Undefined
    } else {
        Variation::Percent((last as f64 - first as f64) / first as f64 * 100.0)
    };

    let counts = series.entries.iter().map(|e| e.count);
    let min_volume = counts.clone().min()?;
    let max_volume = counts.max()?;

    Some(SummaryMetrics {
        variation_pct,
        min_volume,
        max_volume,
        total_volume: series.total(),
    })
}
