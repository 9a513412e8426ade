//! Chart specifications built from monthly series.
//!
//! Specs carry only labels, counts and [`SeriesColor`]s so they can be
//! rendered by the egui shell or serialized as JSON.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::color::{ColorMap, SeriesColor};
use crate::data::aggregate::aggregate;
use crate::data::filter::filter_by;
use crate::data::model::{Dataset, MonthlySeries};

pub const X_TITLE: &str = "Mês";
pub const Y_TITLE: &str = "Volume de Atendimentos";
pub const COMPARISON_TITLE: &str = "Comparação de Volume de Atendimentos - Operações";

/// How hover tooltips group points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoverMode {
    /// One tooltip per trace at the hovered x.
    X,
    /// A single tooltip listing every trace at the hovered x.
    XUnified,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TraceStyle {
    /// Filled down to zero, no outline.
    Area { fill: SeriesColor },
    Line { color: SeriesColor },
}

/// One named series on a categorical month axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<u64>,
    pub style: TraceStyle,
}

impl Trace {
    fn from_series(name: &str, series: &MonthlySeries, style: TraceStyle) -> Self {
        Trace {
            name: name.to_string(),
            x: series.labels(),
            y: series.counts(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub hover: HoverMode,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    /// Distinct x labels across all traces, in first-appearance order.
    ///
    /// Traces are matched on label text only; a label missing from the first
    /// trace is appended after its labels.
    pub fn category_axis(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut axis = Vec::new();
        for label in self.traces.iter().flat_map(|t| t.x.iter()) {
            if seen.insert(label.as_str()) {
                axis.push(label.clone());
            }
        }
        axis
    }
}

/// Colours used by the chart builders for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub area_fill: SeriesColor,
    pub colors: ColorMap,
}

/// Filled area chart of the selected category.
pub fn area_chart(category: &str, series: &MonthlySeries, fill: SeriesColor) -> ChartSpec {
    ChartSpec {
        title: format!("Volume de Atendimentos - {category}"),
        x_title: X_TITLE.to_string(),
        y_title: Y_TITLE.to_string(),
        hover: HoverMode::X,
        traces: vec![Trace::from_series(category, series, TraceStyle::Area { fill })],
    }
}

/// One line per dataset category over `[start_date, end_date]`.
///
/// Categories without any record in the range get no trace.
pub fn comparison_chart(
    dataset: &Dataset,
    start_date: NaiveDate,
    end_date: NaiveDate,
    colors: &ColorMap,
) -> ChartSpec {
    let traces = dataset
        .categories
        .iter()
        .filter_map(|category| {
            let series = aggregate(filter_by(dataset, category, start_date, end_date));
            if series.is_empty() {
                return None;
            }
            let style = TraceStyle::Line {
                color: colors.color_for(category),
            };
            Some(Trace::from_series(category, &series, style))
        })
        .collect();

    ChartSpec {
        title: COMPARISON_TITLE.to_string(),
        x_title: X_TITLE.to_string(),
        y_title: Y_TITLE.to_string(),
        hover: HoverMode::XUnified,
        traces,
    }
}
