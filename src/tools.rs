//! Tool-call contract for an external transport.
//!
//! A transport hands over a tool name plus JSON arguments and gets back
//! either a JSON value or a structured [`EngineError`]. Framing, sessions
//! and the wire protocol stay with the transport.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::data::model::Emotion;
use crate::engine::{
    DEFAULT_SEARCH_LIMIT, MAX_QUERY_CHARS, MAX_SAMPLE, MAX_SEARCH_LIMIT, QueryEngine,
};
use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Tool names and descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    GetSample,
    CountByEmotion,
    SearchText,
    AnalyzeEmotionDistribution,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::GetSample,
        ToolName::CountByEmotion,
        ToolName::SearchText,
        ToolName::AnalyzeEmotionDistribution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetSample => "get_sample",
            ToolName::CountByEmotion => "count_by_emotion",
            ToolName::SearchText => "search_text",
            ToolName::AnalyzeEmotionDistribution => "analyze_emotion_distribution",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                EngineError::invalid(format!(
                    "unknown tool '{s}'; expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Everything a transport needs to advertise one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub read_only: bool,
    pub destructive: bool,
    /// Same arguments, same result. False only for random sampling.
    pub idempotent: bool,
    pub open_world: bool,
}

/// Descriptors for all four tools, in a stable order.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    ToolName::ALL.iter().map(|&tool| describe(tool)).collect()
}

pub fn describe(tool: ToolName) -> ToolDescriptor {
    let emotion_names: Vec<&str> = Emotion::ALL.iter().map(|e| e.name()).collect();
    let (title, description, input_schema) = match tool {
        ToolName::GetSample => (
            "Get Random Samples",
            "Get n random text samples with their emotion labels.",
            json!({
                "type": "object",
                "properties": {
                    "n": {
                        "type": "integer",
                        "description": "Number of random samples to retrieve",
                        "minimum": 1,
                        "maximum": MAX_SAMPLE,
                        "default": DEFAULT_SAMPLE_N,
                    }
                },
                "additionalProperties": false,
            }),
        ),
        ToolName::CountByEmotion => (
            "Count Samples by Emotion",
            "Count the samples labeled with one emotion, with the share of the dataset.",
            json!({
                "type": "object",
                "properties": {
                    "emotion": {
                        "type": "string",
                        "description": "Emotion to count",
                        "enum": emotion_names,
                    }
                },
                "required": ["emotion"],
                "additionalProperties": false,
            }),
        ),
        ToolName::SearchText => (
            "Search Text in Samples",
            "Case-insensitive substring search over sample texts, in dataset order.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Text to search for in samples",
                        "minLength": 1,
                        "maxLength": MAX_QUERY_CHARS,
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "minimum": 1,
                        "maximum": MAX_SEARCH_LIMIT,
                        "default": DEFAULT_SEARCH_LIMIT,
                    }
                },
                "required": ["query"],
                "additionalProperties": false,
            }),
        ),
        ToolName::AnalyzeEmotionDistribution => (
            "Analyze Emotion Distribution",
            "Counts and percentages for every emotion across the whole dataset.",
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        ),
    };

    ToolDescriptor {
        name: tool,
        title,
        description,
        input_schema,
        read_only: true,
        destructive: false,
        idempotent: tool != ToolName::GetSample,
        open_world: false,
    }
}

// ---------------------------------------------------------------------------
// Argument models
// ---------------------------------------------------------------------------

/// `get_sample`'s `n` when the caller omits it.
pub const DEFAULT_SAMPLE_N: i64 = 3;

fn default_sample_n() -> i64 {
    DEFAULT_SAMPLE_N
}

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT as i64
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetSampleArgs {
    #[serde(default = "default_sample_n")]
    pub n: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountByEmotionArgs {
    pub emotion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchTextArgs {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// Deserialize tool arguments; a missing/`null` payload means `{}`.
fn parse_args<T: DeserializeOwned>(tool: ToolName, args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| EngineError::invalid(format!("bad arguments for {tool}: {e}")))
}

/// Negative counts can't reach the engine's `usize` parameters.
fn non_negative(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| EngineError::invalid(format!("{name} must be at least 1, got {value}")))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one tool call with the thread-local RNG.
pub fn call_tool(engine: &QueryEngine, name: &str, args: Value) -> Result<Value> {
    call_tool_with(engine, name, args, &mut rand::thread_rng())
}

/// Run one tool call, drawing samples from `rng`.
pub fn call_tool_with<R: Rng + ?Sized>(
    engine: &QueryEngine,
    name: &str,
    args: Value,
    rng: &mut R,
) -> Result<Value> {
    let tool: ToolName = name.parse()?;
    log::debug!("Tool call {tool}");

    let result = match tool {
        ToolName::GetSample => {
            let args: GetSampleArgs = parse_args(tool, args)?;
            to_json(engine.get_sample_with(non_negative("n", args.n)?, rng)?)
        }
        ToolName::CountByEmotion => {
            let args: CountByEmotionArgs = parse_args(tool, args)?;
            to_json(engine.count_by_emotion(&args.emotion)?)
        }
        ToolName::SearchText => {
            let args: SearchTextArgs = parse_args(tool, args)?;
            let limit = non_negative("limit", args.limit)?;
            to_json(engine.search_text(&args.query, Some(limit))?)
        }
        ToolName::AnalyzeEmotionDistribution => {
            let _: NoArgs = parse_args(tool, args)?;
            to_json(engine.analyze_emotion_distribution()?)
        }
    };

    if let Err(e) = &result {
        log::warn!("Tool call {tool} failed: {e}");
    }
    result
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    // Only string-keyed structs of strings and numbers reach here.
    serde_json::to_value(value).map_err(|e| EngineError::Internal {
        message: format!("unserializable result: {e}"),
    })
}
