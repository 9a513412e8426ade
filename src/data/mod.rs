/// Data layer: core types, loading, filtering, and monthly aggregation.
///
/// Architecture:
/// ```text
///  URL (CSV) / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch / parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category + inclusive date range → Vec<&Record>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  count per calendar month → MonthlySeries
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ metrics   │  variation / min / max → SummaryMetrics
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
