/// Data layer: registry, loading, and scans.
///
/// Architecture:
/// ```text
///  .parquet / .jsonl / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  RecordSource → validate → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, each labeled with an Emotion
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  substring matches, per-label tallies
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod query;
