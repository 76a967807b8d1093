use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use emotion_query::tools::{self, ToolName};
use emotion_query::{EngineConfig, FileSource, QueryEngine};

#[derive(Parser, Debug)]
#[command(name = "emotion-query", about = "Query the labeled text-emotion dataset")]
struct Cli {
    /// Dataset file (.parquet, .jsonl, .json or .csv); overrides EMOTION_DATASET_PATH.
    #[arg(long, value_name = "PATH", global = true)]
    dataset: Option<PathBuf>,

    /// Fail on invalid rows instead of dropping them; overrides EMOTION_STRICT.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tool descriptors.
    Tools,
    /// Run one tool with JSON arguments.
    Call {
        tool: String,
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Random samples.
    Sample {
        #[arg(short, default_value_t = tools::DEFAULT_SAMPLE_N)]
        n: i64,
    },
    /// Count samples for one emotion.
    Count { emotion: String },
    /// Case-insensitive substring search.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Per-emotion distribution.
    Distribution,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (tool, args) = match cli.command {
        Command::Tools => {
            return print_json(&serde_json::to_value(tools::tool_descriptors())?);
        }
        Command::Call { tool, args } => {
            let args: Value = serde_json::from_str(&args).context("parsing tool arguments")?;
            (tool, args)
        }
        Command::Sample { n } => (ToolName::GetSample.to_string(), json!({ "n": n })),
        Command::Count { emotion } => {
            (ToolName::CountByEmotion.to_string(), json!({ "emotion": emotion }))
        }
        Command::Search { query, limit } => {
            let mut args = json!({ "query": query });
            if let Some(limit) = limit {
                args["limit"] = json!(limit);
            }
            (ToolName::SearchText.to_string(), args)
        }
        Command::Distribution => (ToolName::AnalyzeEmotionDistribution.to_string(), json!({})),
    };

    let mut config = EngineConfig::from_env();
    if let Some(path) = cli.dataset {
        config.dataset_path = path;
    }
    config.strict |= cli.strict;

    let mut engine = QueryEngine::new();
    engine.load(&FileSource::new(config.dataset_path.clone()), &config.load_options())?;

    let result = tools::call_tool(&engine, &tool, args)?;
    print_json(&result)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
