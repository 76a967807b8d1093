use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Int16Array, Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray,
    UInt8Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Emotion, RawRecord, Record};
use crate::error::EngineError;

/// How many offending rows are quoted in warnings and errors.
const MAX_REPORTED_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Record sources
// ---------------------------------------------------------------------------

/// Anything that can hand over the labeled corpus as unvalidated rows.
pub trait RecordSource {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Fetch every row, in corpus order.
    fn fetch(&self) -> Result<Vec<RawRecord>>;
}

/// In-memory rows, already fetched.
impl RecordSource for Vec<RawRecord> {
    fn describe(&self) -> String {
        format!("{} in-memory rows", self.len())
    }

    fn fetch(&self) -> Result<Vec<RawRecord>> {
        Ok(self.clone())
    }
}

/// A local file, read according to its extension.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>> {
        read_file(&self.path)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Loader settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fail the whole load on any invalid row instead of dropping it.
    pub strict: bool,
}

/// Fetch rows from `source` and validate them into a [`Dataset`].
///
/// Every row needs non-blank text and a label id in `0..=5`. With
/// `strict` unset, invalid rows are dropped and reported in one warning;
/// with `strict` set, they fail the load in one aggregated error.
pub fn load(source: &dyn RecordSource, options: &LoadOptions) -> Result<Dataset, EngineError> {
    let description = source.describe();
    let raw = source
        .fetch()
        .with_context(|| format!("fetching dataset from {description}"))
        .map_err(|e| EngineError::unavailable(&e))?;

    let dataset = validate(raw, options.strict)?;
    log::info!("Loaded {} records from {description}", dataset.len());
    Ok(dataset)
}

fn validate(raw: Vec<RawRecord>, strict: bool) -> Result<Dataset, EngineError> {
    let total = raw.len();
    let mut records = Vec::with_capacity(total);
    let mut rejected: Vec<(usize, String)> = Vec::new();

    for (row, rec) in raw.into_iter().enumerate() {
        match check_row(rec) {
            Ok(record) => records.push(record),
            Err(reason) => rejected.push((row, reason)),
        }
    }

    if !rejected.is_empty() {
        let summary = summarize(&rejected);
        if strict {
            return Err(EngineError::DataUnavailable {
                message: format!("{} of {total} rows are invalid: {summary}", rejected.len()),
            });
        }
        log::warn!(
            "Dropped {} of {total} invalid rows: {summary}",
            rejected.len()
        );
    }

    Dataset::from_records(records)
}

fn check_row(raw: RawRecord) -> std::result::Result<Record, String> {
    let text = match raw.text {
        Some(t) if !t.trim().is_empty() => t,
        Some(_) => return Err("empty text".to_string()),
        None => return Err("missing text".to_string()),
    };
    let label = match raw.label {
        Some(id) => Emotion::from_label_id(id).ok_or_else(|| format!("label {id} out of range 0-5"))?,
        None => return Err("missing or non-integer label".to_string()),
    };
    Ok(Record { text, label })
}

fn summarize(rejected: &[(usize, String)]) -> String {
    let mut parts: Vec<String> = rejected
        .iter()
        .take(MAX_REPORTED_ROWS)
        .map(|(row, reason)| format!("row {row}: {reason}"))
        .collect();
    if rejected.len() > MAX_REPORTED_ROWS {
        parts.push(format!("and {} more", rejected.len() - MAX_REPORTED_ROWS));
    }
    parts.join("; ")
}

// ---------------------------------------------------------------------------
// File dispatch
// ---------------------------------------------------------------------------

/// Read raw rows from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `text` string column and `label` integer column
/// * `.jsonl`   – one `{ "text": ..., "label": ... }` object per line
/// * `.json`    – `[{ "text": ..., "label": ... }, ...]`
/// * `.csv`     – header row with `text` and `label` columns
pub fn read_file(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => read_parquet(path),
        "jsonl" => read_jsonl(path),
        "json" => read_json(path),
        "csv" => read_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| json_to_raw(row, i))
        .collect()
}

fn read_jsonl(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening JSONL file")?;
    let reader = std::io::BufReader::new(file);

    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading JSONL line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: JsonValue = serde_json::from_str(&line)
            .with_context(|| format!("parsing JSONL line {line_no}"))?;
        rows.push(json_to_raw(&value, line_no)?);
    }
    Ok(rows)
}

fn json_to_raw(row: &JsonValue, i: usize) -> Result<RawRecord> {
    let obj = row
        .as_object()
        .with_context(|| format!("Row {i} is not a JSON object"))?;

    Ok(RawRecord {
        text: obj.get("text").and_then(|v| v.as_str()).map(str::to_string),
        label: obj.get("label").and_then(|v| v.as_i64()),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with at least `text` and `label`; other columns
/// are ignored. An empty or non-integer `label` cell is kept as missing.
fn read_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let text_idx = headers
        .iter()
        .position(|h| h == "text")
        .context("CSV missing 'text' column")?;
    let label_idx = headers
        .iter()
        .position(|h| h == "label")
        .context("CSV missing 'label' column")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(RawRecord {
            text: record.get(text_idx).map(str::to_string),
            label: record
                .get(label_idx)
                .and_then(|cell| cell.trim().parse::<i64>().ok()),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file in the layout the corpus is published in.
///
/// Expected schema:
/// - `text`: Utf8 or LargeUtf8
/// - `label`: any signed integer width, or UInt8 (ClassLabel columns)
/// - Any other columns are ignored
fn read_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let first_row = rows.len();
        read_batch(&batch, first_row, &mut rows)?;
    }

    Ok(rows)
}

/// Append one record batch to `rows`. `first_row` is the file-wide row
/// number of the batch's first row, used in error contexts.
fn read_batch(batch: &RecordBatch, first_row: usize, rows: &mut Vec<RawRecord>) -> Result<()> {
    let schema = batch.schema();

    let text_idx = schema
        .index_of("text")
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'text' column"))?;
    let label_idx = schema
        .index_of("label")
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'label' column"))?;

    let text_col = batch.column(text_idx);
    let label_col = batch.column(label_idx);

    for row in 0..batch.num_rows() {
        let file_row = first_row + row;
        let text = extract_string(text_col, row)
            .with_context(|| format!("Row {file_row}: failed to read 'text'"))?;
        let label = extract_label(label_col, row)
            .with_context(|| format!("Row {file_row}: failed to read 'label'"))?;
        rows.push(RawRecord { text, label });
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Extract an optional string cell from a Utf8 / LargeUtf8 column.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .context("expected LargeStringArray")?
            .value(row),
        other => bail!("Expected Utf8 or LargeUtf8 column, got {other:?}"),
    };
    Ok(Some(value.to_string()))
}

/// Extract an optional integer label cell, widening to `i64`.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<Option<i64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as i64,
        DataType::Int16 => any
            .downcast_ref::<Int16Array>()
            .context("expected Int16Array")?
            .value(row) as i64,
        DataType::Int8 => any
            .downcast_ref::<Int8Array>()
            .context("expected Int8Array")?
            .value(row) as i64,
        DataType::UInt8 => any
            .downcast_ref::<UInt8Array>()
            .context("expected UInt8Array")?
            .value(row) as i64,
        other => bail!("Expected integer label column, got {other:?}"),
    };
    Ok(Some(value))
}
