use std::path::{Path, PathBuf};
use std::sync::Arc;

use nomi_piacenza::data::model::{AggregateRow, Dataset, Field};
use nomi_piacenza::data::query::{self, QueryParams, SortOrder};
use nomi_piacenza::data::store::DatasetStore;

use crate::color::ColorMap;

/// Bars shown in the histogram.
pub const BAR_LIMIT: usize = 20;
/// Slices shown in the pie chart.
pub const PIE_LIMIT: usize = 10;

/// Default birth-year window, clamped to the dataset range.
const DEFAULT_YEARS: (i32, i32) = (2015, 2025);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<Dataset>>,
    /// File the dataset came from.
    pub source: Option<PathBuf>,

    // ---- filter widgets ----
    pub name_contains: String,
    /// Empty means "all".
    pub citizenship_group: String,
    /// Empty means "all".
    pub sex: String,
    pub year_min: i32,
    pub year_max: i32,
    pub sort_field: Field,
    pub sort_order: SortOrder,

    // ---- chart widgets ----
    pub chart_kind: ChartKind,
    pub group_field: Field,

    /// Indices of records passing the current filters, in display order (cached).
    pub visible_indices: Vec<usize>,
    /// Aggregation of the visible records (cached).
    pub chart_rows: Vec<AggregateRow>,
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            source: None,
            name_contains: String::new(),
            citizenship_group: String::new(),
            sex: String::new(),
            year_min: DEFAULT_YEARS.0,
            year_max: DEFAULT_YEARS.1,
            sort_field: Field::Occurrences,
            sort_order: SortOrder::Descending,
            chart_kind: ChartKind::Bar,
            group_field: Field::Name,
            visible_indices: Vec::new(),
            chart_rows: Vec::new(),
            color_map: ColorMap::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load `path` through a [`DatasetStore`] and show it.
    pub fn open(&mut self, path: &Path) {
        let store = DatasetStore::new(path);
        match store.load() {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the year window to it.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, source: PathBuf) {
        let (lo, hi) = dataset.year_range.unwrap_or(DEFAULT_YEARS);
        let (min, max) = (DEFAULT_YEARS.0.clamp(lo, hi), DEFAULT_YEARS.1.clamp(lo, hi));
        self.year_min = min;
        self.year_max = max;

        self.dataset = Some(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.refilter();
    }

    /// The engine parameters described by the filter widgets.
    pub fn params(&self) -> QueryParams {
        let text = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
        QueryParams {
            name_contains: text(&self.name_contains),
            citizenship_group: text(&self.citizenship_group),
            sex: text(&self.sex),
            birth_year_min: Some(self.year_min),
            birth_year_max: Some(self.year_max),
            sort_field: Some(self.sort_field),
            sort_order: self.sort_order,
            group_field: Some(self.group_field),
        }
    }

    /// Recompute the visible rows and the chart after any widget change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };

        let params = self.params();
        let result = query::select_indices(ds, &params).and_then(|indices| {
            let rows = indices.iter().map(|&i| &ds.records()[i]);
            let totals = query::group_totals(rows, self.group_field)?;
            Ok((indices, totals))
        });

        match result {
            Ok((indices, totals)) => {
                self.color_map = ColorMap::new(totals.iter().take(BAR_LIMIT).map(|r| &r.key));
                self.visible_indices = indices;
                self.chart_rows = totals;
            }
            Err(e) => {
                log::error!("Query failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.visible_indices.clear();
                self.chart_rows.clear();
            }
        }
    }
}
