use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use emotion_query::Emotion;

/// Write a synthetic labeled corpus in the `text` / `label` parquet layout.
#[derive(Parser, Debug)]
struct Args {
    /// Output file.
    #[arg(long, default_value = "sample_data.parquet")]
    output: PathBuf,

    /// Number of rows to generate.
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Relative class weights of the training split (sadness..surprise).
const CLASS_WEIGHTS: [u32; Emotion::COUNT] = [4666, 5362, 1304, 2159, 1937, 572];

const OPENERS: [&str; 4] = ["i feel", "i am feeling", "i have been feeling", "im starting to feel"];

fn cue_words(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Sadness => &["lonely", "miserable", "hopeless", "gloomy"],
        Emotion::Joy => &["happy", "content", "cheerful", "glad"],
        Emotion::Love => &["affectionate", "tender", "caring", "adored"],
        Emotion::Anger => &["furious", "irritated", "resentful", "bitter"],
        Emotion::Fear => &["scared", "anxious", "nervous", "terrified"],
        Emotion::Surprise => &["amazed", "stunned", "astonished", "shocked"],
    }
}

fn pick_emotion(rng: &mut StdRng) -> Emotion {
    let total: u32 = CLASS_WEIGHTS.iter().sum();
    let mut roll = rng.gen_range(0..total);
    for (emotion, weight) in Emotion::ALL.iter().zip(CLASS_WEIGHTS) {
        if roll < weight {
            return *emotion;
        }
        roll -= weight;
    }
    Emotion::Surprise
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut texts: Vec<String> = Vec::with_capacity(args.rows);
    let mut labels: Vec<i64> = Vec::with_capacity(args.rows);

    for row in 0..args.rows {
        let emotion = pick_emotion(&mut rng);
        let opener = OPENERS.choose(&mut rng).copied().unwrap_or("i feel");
        let cue = cue_words(emotion).choose(&mut rng).copied().unwrap_or("fine");
        texts.push(format!("{opener} {cue} about day {row}"));
        labels.push(emotion.label_id() as i64);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("text", DataType::Utf8, false),
        Field::new("label", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(texts)),
            Arc::new(Int64Array::from(labels)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    println!("Wrote {} rows to {}", args.rows, args.output.display());
    Ok(())
}
