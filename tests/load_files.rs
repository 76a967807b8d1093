use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;
use tempfile::TempDir;

use emotion_query::tools::call_tool;
use emotion_query::{Emotion, FileSource, LoadOptions, QueryEngine};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn write_parquet(path: &Path, texts: Vec<Option<&str>>, labels: Vec<Option<i64>>) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("text", DataType::Utf8, true),
        Field::new("label", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(texts)),
            Arc::new(Int64Array::from(labels)),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn load(path: &Path, strict: bool) -> emotion_query::Result<QueryEngine> {
    let mut engine = QueryEngine::new();
    engine.load(&FileSource::new(path), &LoadOptions { strict })?;
    Ok(engine)
}

#[test]
fn parquet_corpus_answers_queries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("train.parquet");
    write_parquet(
        &path,
        vec![
            Some("i didnt feel humiliated"),
            Some("i am feeling grouchy"),
            Some("im grabbing a minute to post i feel greedy wrong"),
            Some("i feel happy and loved"),
        ],
        vec![Some(0), Some(3), Some(3), Some(1)],
    );

    let engine = load(&path, true).unwrap();
    assert_eq!(engine.dataset_len(), Some(4));

    let anger = engine.count_by_emotion("anger").unwrap();
    assert_eq!((anger.count, anger.total, anger.percentage), (2, 4, 50.0));

    let hits = engine.search_text("FEEL", None).unwrap();
    assert_eq!(hits.count, 4);
    assert_eq!(hits.results[3].emotion, Emotion::Joy);
}

#[test]
fn parquet_nulls_follow_strictness() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nulls.parquet");
    write_parquet(
        &path,
        vec![Some("i feel fine"), None, Some("i feel odd")],
        vec![Some(1), Some(1), None],
    );

    let err = load(&path, true).unwrap_err();
    assert_eq!(err.kind(), "data_unavailable");
    assert!(err.to_string().contains("2 of 3 rows are invalid"));

    let engine = load(&path, false).unwrap();
    assert_eq!(engine.dataset_len(), Some(1));
}

#[test]
fn parquet_with_int32_labels_and_extra_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("int32.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("idx", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("label", DataType::Int32, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![10, 11])),
            Arc::new(StringArray::from(vec!["i feel amazed", "i feel scared"])),
            Arc::new(Int32Array::from(vec![5, 4])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let engine = load(&path, true).unwrap();
    let dist = engine.analyze_emotion_distribution().unwrap();
    assert_eq!(dist.distribution[4].count, 1);
    assert_eq!(dist.distribution[5].count, 1);
}

#[test]
fn parquet_missing_label_column_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nolabel.parquet");
    let schema = Arc::new(Schema::new(vec![Field::new("text", DataType::Utf8, false)]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(StringArray::from(vec!["i feel nothing"]))],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let err = load(&path, false).unwrap_err();
    assert!(err.to_string().contains("missing 'label' column"));
}

#[test]
fn csv_corpus_loads_and_drops_bad_labels() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "train.csv",
        "text,label\n\"i feel, honestly, great\",1\ni feel sad,0\ni feel weird,x\n",
    );

    let engine = load(&path, false).unwrap();
    assert_eq!(engine.dataset_len(), Some(2));
    let hits = engine.search_text("honestly", None).unwrap();
    assert_eq!(hits.results[0].text, "i feel, honestly, great");

    assert!(load(&path, true).is_err());
}

#[test]
fn csv_without_text_column_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.csv", "sentence,label\nhello,1\n");
    let err = load(&path, false).unwrap_err();
    assert!(err.to_string().contains("CSV missing 'text' column"));
}

#[test]
fn jsonl_corpus_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "train.jsonl",
        "{\"text\": \"i feel loved\", \"label\": 2}\n\n{\"text\": \"i feel tense\", \"label\": 4}\n",
    );

    let engine = load(&path, true).unwrap();
    let love = call_tool(&engine, "count_by_emotion", json!({ "emotion": "love" })).unwrap();
    assert_eq!(love, json!({ "emotion": "love", "count": 1, "total": 2, "percentage": 50.0 }));
}

#[test]
fn json_array_corpus_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "train.json",
        r#"[{"text": "i feel rage", "label": 3}, {"text": "i feel calm", "label": 1}]"#,
    );

    let engine = load(&path, true).unwrap();
    let sample = engine.get_sample(2).unwrap();
    assert_eq!(sample.len(), 2);
    assert_ne!(sample[0].text, sample[1].text);
}

#[test]
fn json_rows_must_be_objects() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "rows.json", r#"[["i feel", 1]]"#);
    let err = load(&path, false).unwrap_err();
    assert!(err.to_string().contains("Row 0 is not a JSON object"));
}
