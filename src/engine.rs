use rand::Rng;
use serde::Serialize;

use crate::data::loader::{self, LoadOptions, RecordSource};
use crate::data::model::{Dataset, Emotion, Record};
use crate::data::query;
use crate::error::{EngineError, Result};

/// Upper bound for `get_sample`'s `n`.
pub const MAX_SAMPLE: usize = 100;
/// Upper bound for `search_text`'s `limit`.
pub const MAX_SEARCH_LIMIT: usize = 100;
/// `search_text`'s limit when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Longest accepted search query, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One record as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleItem {
    pub text: String,
    pub emotion: Emotion,
    pub label_id: u8,
}

impl From<&Record> for SampleItem {
    fn from(record: &Record) -> Self {
        Self {
            text: record.text.clone(),
            emotion: record.label,
            label_id: record.label.label_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub count: usize,
    pub results: Vec<SampleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub emotion: Emotion,
    pub count: usize,
    pub percentage: f64,
}

/// Per-emotion breakdown, one entry per registered emotion by label id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub total_samples: usize,
    pub distribution: Vec<DistributionEntry>,
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// Lifecycle of the engine. There is no way back to `Unloaded`.
#[derive(Debug, Default)]
enum EngineState {
    #[default]
    Unloaded,
    Ready(Dataset),
}

/// Answers the four read-only queries against the loaded dataset.
///
/// Queries take `&self`, so a ready engine can sit behind an `Arc` and
/// serve concurrent callers without locking.
#[derive(Debug, Default)]
pub struct QueryEngine {
    state: EngineState,
}

impl QueryEngine {
    /// An engine with no dataset yet; every query fails with `NotReady`.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that is ready with the given dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            state: EngineState::Ready(dataset),
        }
    }

    /// Run the loader once and move to `Ready`.
    ///
    /// Calling this on a ready engine keeps the first dataset.
    pub fn load(&mut self, source: &dyn RecordSource, options: &LoadOptions) -> Result<()> {
        if self.is_ready() {
            log::debug!("Dataset already loaded; ignoring reload of {}", source.describe());
            return Ok(());
        }
        let dataset = loader::load(source, options)?;
        self.state = EngineState::Ready(dataset);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    /// Number of loaded records, or `None` before loading.
    pub fn dataset_len(&self) -> Option<usize> {
        self.dataset().ok().map(Dataset::len)
    }

    fn dataset(&self) -> Result<&Dataset> {
        match &self.state {
            EngineState::Ready(ds) => Ok(ds),
            EngineState::Unloaded => Err(EngineError::NotReady),
        }
    }

    /// Draw `n` distinct records at random using the thread-local RNG.
    pub fn get_sample(&self, n: usize) -> Result<Vec<SampleItem>> {
        self.get_sample_with(n, &mut rand::thread_rng())
    }

    /// Draw `n` distinct records uniformly without replacement from `rng`.
    ///
    /// Results come back in draw order.
    pub fn get_sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<SampleItem>> {
        let ds = self.dataset()?;
        if n == 0 {
            return Err(EngineError::invalid("n must be at least 1"));
        }
        if n > MAX_SAMPLE {
            return Err(EngineError::invalid(format!(
                "n must be at most {MAX_SAMPLE}, got {n}"
            )));
        }
        if n > ds.len() {
            return Err(EngineError::invalid(format!(
                "n must not exceed the dataset size {}, got {n}",
                ds.len()
            )));
        }

        log::debug!("get_sample n={n}");
        let items = rand::seq::index::sample(rng, ds.len(), n)
            .into_iter()
            .map(|idx| SampleItem::from(&ds.records()[idx]))
            .collect();
        Ok(items)
    }

    /// Count records labeled with the named emotion.
    pub fn count_by_emotion(&self, emotion: &str) -> Result<EmotionCount> {
        let ds = self.dataset()?;
        let emotion: Emotion = emotion.parse()?;

        log::debug!("count_by_emotion emotion={emotion}");
        let count = ds
            .records()
            .iter()
            .filter(|record| record.label == emotion)
            .count();
        let total = ds.len();
        Ok(EmotionCount {
            emotion,
            count,
            total,
            percentage: query::percentage(count, total),
        })
    }

    /// Case-insensitive substring search; the first `limit` hits in
    /// dataset order. `None` means [`DEFAULT_SEARCH_LIMIT`].
    pub fn search_text(&self, query: &str, limit: Option<usize>) -> Result<SearchResults> {
        let ds = self.dataset()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::invalid("query must not be empty"));
        }
        let chars = query.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(EngineError::invalid(format!(
                "query must be at most {MAX_QUERY_CHARS} characters, got {chars}"
            )));
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(EngineError::invalid(format!(
                "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
            )));
        }

        log::debug!("search_text query={query:?} limit={limit}");
        let results: Vec<SampleItem> = query::matching_indices(ds, query, limit)
            .into_iter()
            .map(|idx| SampleItem::from(&ds.records()[idx]))
            .collect();
        Ok(SearchResults {
            query: query.to_string(),
            count: results.len(),
            results,
        })
    }

    /// Counts and percentages for every emotion, zero counts included.
    pub fn analyze_emotion_distribution(&self) -> Result<Distribution> {
        let ds = self.dataset()?;
        let counts = query::label_counts(ds);
        let total = ds.len();

        log::debug!("analyze_emotion_distribution total={total}");
        let distribution = Emotion::ALL
            .iter()
            .map(|&emotion| {
                let count = counts[emotion.label_id() as usize];
                DistributionEntry {
                    emotion,
                    count,
                    percentage: query::percentage(count, total),
                }
            })
            .collect();
        Ok(Distribution {
            total_samples: total,
            distribution,
        })
    }
}
