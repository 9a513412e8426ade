use crate::charts::{ChartSpec, ChartStyle, area_chart, comparison_chart};
use crate::data::aggregate::aggregate;
use crate::data::filter::filter;
use crate::data::metrics::summarize;
use crate::data::model::{Dataset, FilterCriteria, MonthlySeries, SummaryMetrics};

/// Everything the shell shows for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    /// Number of records that passed the filter.
    pub matched: usize,
    pub series: MonthlySeries,
    /// `None` when the selection matched nothing.
    pub metrics: Option<SummaryMetrics>,
    pub area: Option<ChartSpec>,
    pub comparison: Option<ChartSpec>,
}

impl DashboardView {
    pub fn has_data(&self) -> bool {
        self.metrics.is_some()
    }
}

/// Run filter → aggregate → summarize → charts for one selection.
///
/// An empty selection yields no metrics and no charts, comparison included.
pub fn build_view(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    style: &ChartStyle,
) -> DashboardView {
    let matched = filter(dataset, criteria);
    let series = aggregate(matched.iter().copied());
    let metrics = summarize(&series);

    let (area, comparison) = if metrics.is_some() {
        (
            Some(area_chart(&criteria.category, &series, style.area_fill)),
            Some(comparison_chart(
                dataset,
                criteria.start_date,
                criteria.end_date,
                &style.colors,
            )),
        )
    } else {
        (None, None)
    };

    log::debug!(
        "View for '{}' {}..={}: {} records, {} months",
        criteria.category,
        criteria.start_date,
        criteria.end_date,
        matched.len(),
        series.len()
    );

    DashboardView {
        criteria: criteria.clone(),
        matched: matched.len(),
        series,
        metrics,
        area,
        comparison,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::color::{ColorMap, SeriesColor};
    use crate::data::model::{Record, Variation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (Dataset, ChartStyle) {
        let mut records = Vec::new();
        for day in [2, 10, 28] {
            records.push(Record::new("Assistente CSF", d(2024, 1, day)));
        }
        for day in [3, 4] {
            records.push(Record::new("Assistente CSF", d(2024, 3, day)));
        }
        records.push(Record::new("Assistente CSF CM", d(2024, 2, 14)));
        let ds = Dataset::from_records(records, Vec::new());
        let style = ChartStyle {
            area_fill: SeriesColor::AREA_FILL,
            colors: ColorMap::new(&ds.categories, &BTreeMap::new()),
        };
        (ds, style)
    }

    #[test]
    fn full_pipeline_for_selection() {
        let (ds, style) = setup();
        let criteria = ds.default_criteria().unwrap();
        let view = build_view(&ds, &criteria, &style);

        assert!(view.has_data());
        assert_eq!(view.matched, 5);
        assert_eq!(view.series.labels(), vec!["Jan 2024", "Mar 2024"]);

        let metrics = view.metrics.unwrap();
        let pct = metrics.variation_pct.as_percent().unwrap();
        assert!((pct + 33.33).abs() < 0.01);
        assert_eq!((metrics.min_volume, metrics.max_volume), (2, 3));

        assert_eq!(view.area.unwrap().traces.len(), 1);
        assert_eq!(view.comparison.unwrap().traces.len(), 2);
    }

    #[test]
    fn empty_selection_skips_metrics_and_charts() {
        let (ds, style) = setup();
        let criteria = FilterCriteria {
            category: "Assistente CSF CM".to_string(),
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 31),
        };
        let view = build_view(&ds, &criteria, &style);

        assert!(!view.has_data());
        assert_eq!(view.matched, 0);
        assert!(view.series.is_empty());
        assert!(view.area.is_none());
        assert!(view.comparison.is_none());
    }

    #[test]
    fn single_month_selection() {
        let (ds, style) = setup();
        let criteria = FilterCriteria {
            category: "Assistente CSF CM".to_string(),
            start_date: d(2024, 1, 1),
            end_date: d(2024, 12, 31),
        };
        let metrics = build_view(&ds, &criteria, &style).metrics.unwrap();
        assert_eq!(metrics.variation_pct, Variation::Percent(0.0));
        assert_eq!(metrics.min_volume, 1);
        assert_eq!(metrics.max_volume, 1);
    }
}
