use chrono::NaiveDate;

use crate::charts::ChartStyle;
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::loader::{Source, load_source};
use crate::data::model::{Dataset, FilterCriteria};
use crate::view::{DashboardView, build_view};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Main,
    Wiki,
}

/// The full session state, independent of rendering.
///
/// Owned by the app and passed to every panel; the view is re-derived from
/// `dataset` and `criteria` after each change.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded call log (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Where `dataset` came from.
    pub source: Option<Source>,

    /// Colours for the current dataset's categories.
    pub style: Option<ChartStyle>,

    /// Current selection.
    pub criteria: Option<FilterCriteria>,

    /// Pipeline output for `criteria`.
    pub view: Option<DashboardView>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            style: None,
            criteria: None,
            view: None,
            tab: Tab::Main,
            status_message: None,
        }
    }

    /// Load from the configured source.
    pub fn reload(&mut self) {
        let source = self.config.source();
        self.load(source);
    }

    /// Load a dataset; on failure keep the previous one and show the error.
    pub fn load(&mut self, source: Source) {
        match load_source(&source, &self.config.columns(), self.config.timeout()) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {source} ({} categories, extra columns {:?})",
                    dataset.len(),
                    dataset.categories.len(),
                    dataset.extra_columns
                );
                self.source = Some(source);
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {source}: {e:#}");
                self.status_message = Some(format!("Erro ao carregar dados: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset the selection and colours.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.style = Some(ChartStyle {
            area_fill: self.config.area_fill,
            colors: ColorMap::new(&dataset.categories, &self.config.pinned_colors),
        });
        self.criteria = dataset.default_criteria();
        self.status_message = if dataset.is_empty() {
            Some("O arquivo não contém registros.".to_string())
        } else {
            None
        };
        self.dataset = Some(dataset);
        self.refresh_view();
    }

    /// Recompute `view` after a selection change.
    pub fn refresh_view(&mut self) {
        self.view = match (&self.dataset, &self.criteria, &self.style) {
            (Some(ds), Some(criteria), Some(style)) => Some(build_view(ds, criteria, style)),
            _ => None,
        };
    }

    pub fn set_category(&mut self, category: String) {
        if let Some(criteria) = &mut self.criteria {
            if criteria.category != category {
                criteria.category = category;
                self.refresh_view();
            }
        }
    }

    /// Set the start date, clamped to the dataset's date range.
    pub fn set_start_date(&mut self, date: NaiveDate) {
        let date = self.clamp_to_bounds(date);
        if let Some(criteria) = &mut self.criteria {
            if criteria.start_date != date {
                criteria.start_date = date;
                self.refresh_view();
            }
        }
    }

    /// Set the end date, clamped to the dataset's date range.
    pub fn set_end_date(&mut self, date: NaiveDate) {
        let date = self.clamp_to_bounds(date);
        if let Some(criteria) = &mut self.criteria {
            if criteria.end_date != date {
                criteria.end_date = date;
                self.refresh_view();
            }
        }
    }

    fn clamp_to_bounds(&self, date: NaiveDate) -> NaiveDate {
        match self.dataset.as_ref().and_then(|ds| ds.date_bounds) {
            Some((lo, hi)) => date.clamp(lo, hi),
            None => date,
        }
    }
}
