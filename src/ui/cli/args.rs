use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueHint};
use serde_json::{Map, Value};

use crate::evaluation::CurveFormat;
use crate::ui::types::choices::{
    LearnerChoice, PrequentialParams, StreamChoice, UIChoice, specs_for_kind,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prequential runner for incremental decision trees with split re-evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test-then-train a learner on a stream
    Run(RunArgs),
    /// Print the parameters a learner or stream accepts
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Learner to use (hoeffding-tree, efdt, plastic, adaptive-plastic, efhat)
    #[arg(long, default_value = "plastic", value_name = "LEARNER")]
    pub learner: String,

    /// Stream to consume (e.g. sea-generator)
    #[arg(long, default_value = "sea-generator", value_name = "STREAM")]
    pub stream: String,

    /// Stop after this many instances (omit for unlimited)
    #[arg(long, value_name = "N")]
    pub max_instances: Option<u64>,

    /// Stop after this many CPU seconds (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub max_seconds: Option<u64>,

    /// Emit metrics every N instances
    #[arg(
        long,
        default_value_t = 10_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub sample_frequency: u64,

    /// Update the RAM-hours estimate every N instances
    #[arg(
        long,
        default_value_t = 10_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub mem_check_frequency: u64,

    /// File to dump evaluation snapshots to after completion
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Format for the dump file (csv, tsv, json)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub dump_format: String,

    /// Override learner parameters (key=value, nested keys with dots)
    #[arg(long = "learner-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub learner_params: Vec<KeyValue>,

    /// Override stream parameters (key=value, nested keys with dots)
    #[arg(long = "stream-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub stream_params: Vec<KeyValue>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Describe the parameters of this learner kind
    #[arg(long, value_name = "LEARNER", conflicts_with = "stream")]
    pub learner: Option<String>,

    /// Describe the parameters of this stream kind
    #[arg(long, value_name = "STREAM")]
    pub stream: Option<String>,
}

#[derive(Clone, Debug)]
pub struct KeyValue {
    key: String,
    value: Value,
}

impl RunArgs {
    pub fn into_params(self) -> Result<PrequentialParams> {
        let learner = build_choice::<LearnerChoice>(&self.learner, &self.learner_params)
            .with_context(|| format!("invalid learner '{}'", self.learner))?;
        let stream = build_choice::<StreamChoice>(&self.stream, &self.stream_params)
            .with_context(|| format!("invalid stream '{}'", self.stream))?;
        let dump_format = parse_kind::<CurveFormat>(&self.dump_format)
            .with_context(|| format!("invalid dump format '{}'", self.dump_format))?;

        Ok(PrequentialParams {
            learner,
            stream,
            max_instances: self.max_instances,
            max_seconds: self.max_seconds,
            sample_frequency: self.sample_frequency,
            mem_check_frequency: self.mem_check_frequency,
            dump_file: self.dump_file,
            dump_format,
        })
    }
}

impl SchemaArgs {
    /// Field listing for the requested kind, or the whole learner schema as
    /// JSON when no kind is given.
    pub fn render(&self) -> Result<String> {
        if let Some(raw) = &self.learner {
            return describe::<LearnerChoice>(raw);
        }
        if let Some(raw) = &self.stream {
            return describe::<StreamChoice>(raw);
        }
        serde_json::to_string_pretty(&LearnerChoice::schema()).context("failed to render schema")
    }
}

fn describe<C>(raw: &str) -> Result<String>
where
    C: UIChoice,
    C::Kind: FromStr,
{
    let kind = parse_kind::<C::Kind>(raw).with_context(|| known_kinds::<C>())?;
    let key: &'static str = kind.into();
    let specs = specs_for_kind(&C::schema(), key)?;
    let mut lines = vec![format!("{key}:")];
    lines.extend(specs.iter().map(|s| format!("  {s}")));
    Ok(lines.join("\n"))
}

fn known_kinds<C: UIChoice>() -> String {
    format!("known kinds:\n  {}", C::describe_kinds().join("\n  "))
}

fn build_choice<C>(kind_input: &str, overrides: &[KeyValue]) -> Result<C>
where
    C: UIChoice,
    C::Kind: FromStr,
{
    let kind = parse_kind::<C::Kind>(kind_input).with_context(|| known_kinds::<C>())?;
    let mut params = C::default_params(kind);
    apply_overrides(&mut params, overrides)?;
    C::from_parts(kind, params)
}

/// Accepts `adaptive-plastic`, `AdaptivePlastic` and `adaptive_plastic`.
fn parse_kind<T: FromStr>(raw: &str) -> Result<T> {
    candidate_spellings(raw)
        .iter()
        .find_map(|c| c.parse::<T>().ok())
        .ok_or_else(|| anyhow!("could not parse value '{raw}'"))
}

fn candidate_spellings(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut out = vec![
        trimmed.to_string(),
        trimmed.to_lowercase(),
        kebab_from_token(trimmed),
        trimmed.replace('_', "-").to_lowercase(),
    ];
    out.dedup();
    out
}

fn kebab_from_token(token: &str) -> String {
    let mut buf = String::new();
    let mut prev_lower = false;
    for ch in token.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                buf.push('-');
            }
            buf.extend(ch.to_lowercase());
            prev_lower = false;
        } else if ch == '_' {
            buf.push('-');
            prev_lower = false;
        } else {
            buf.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    buf
}

fn apply_overrides(target: &mut Value, overrides: &[KeyValue]) -> Result<()> {
    for kv in overrides {
        set_path(target, &kv.key, kv.value.clone())
            .with_context(|| format!("failed to set '{}'", kv.key))?;
    }
    Ok(())
}

fn set_path(target: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        bail!("empty key is not allowed");
    };

    let mut current = target;
    for seg in parents {
        current = as_object(current)?
            .entry((*seg).to_string())
            .or_insert(Value::Null);
    }
    as_object(current)?.insert((*last).to_string(), new_value);
    Ok(())
}

fn as_object(value: &mut Value) -> Result<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("cannot set nested field on non-object value: {other:?}"),
    }
}

fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }
    Ok(KeyValue {
        key: key.to_string(),
        value: parse_literal(value.trim()),
    })
}

/// JSON literal when it parses as one, plain string otherwise.
fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
