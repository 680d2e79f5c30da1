//! SubCodec CLI: encode and decode SCALE payloads from the shell.
//!
//! # Commands
//! ```text
//! subcodec encode    --value <json|@file>
//! subcodec decode    --shape <json|@file> --data <hex>... [--lenient] [--prefix]
//! subcodec wire-type --shape <json|@file>
//! subcodec compact   encode <n> | decode <hex>
//! subcodec test      --fixtures <vectors.json>
//! subcodec bench     --value <json|@file> --iterations <N>
//! ```
//!
//! Values and shapes use the library's JSON form, e.g.
//! `{"type":"tuple","value":[{"type":"uint","value":64},{"type":"bytes"}]}`.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use subcodec_core::{
    batch::{decode_batch, encode_batch, partition_results},
    decode_compact, encode_compact, resolve_wire_type, Decoder, Encoder, Shape, TrailingBytes, Value, U256,
};
use subcodec_observability::init_tracing;
use tracing::debug;

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "subcodec",
    about = "Shape-directed SCALE codec: SubCodec CLI",
    long_about = "
SubCodec CLI: encode values to the Substrate SCALE wire format and decode
payloads against a shape. Output is JSON on stdout; logs go to stderr.

Log level comes from --verbose or the `log` section of --config.
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML file with `codec` and `log` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON value to SCALE bytes
    Encode {
        /// Value as JSON, or @path to a JSON file
        #[arg(long)]
        value: String,
    },

    /// Decode SCALE bytes against a shape
    Decode {
        /// Shape as JSON, or @path to a JSON file
        #[arg(long)]
        shape: String,
        /// Payload hex (0x-prefixed or bare); repeat to decode in parallel
        #[arg(long, num_args = 1.., required = true)]
        data: Vec<String>,
        /// Ignore bytes left over after the value
        #[arg(long)]
        lenient: bool,
        /// Decode a leading value and report how many bytes it used
        #[arg(long, conflicts_with = "lenient")]
        prefix: bool,
    },

    /// Print the wire type a shape resolves to
    #[command(name = "wire-type")]
    WireType {
        #[arg(long)]
        shape: String,
    },

    /// Compact integer helpers
    Compact {
        #[command(subcommand)]
        action: CompactAction,
    },

    /// Check a golden vector file against the codec
    Test {
        #[arg(long, default_value = "./fixtures/vectors.json")]
        fixtures: PathBuf,
        /// Only run vectors whose name contains this string
        #[arg(long)]
        filter: Option<String>,
    },

    /// Measure parallel encode/decode throughput for one value
    Bench {
        #[arg(long)]
        value: String,
        #[arg(long, default_value_t = 10_000)]
        iterations: usize,
    },
}

#[derive(Subcommand)]
enum CompactAction {
    /// Encode a decimal or 0x-hex integer
    Encode { n: String },
    /// Decode a compact integer from hex
    Decode { hex: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Encode { value } => cmd_encode(&value, &config),
        Commands::Decode { shape, data, lenient, prefix } => {
            if lenient {
                config.codec.trailing_bytes = TrailingBytes::Allow;
            }
            cmd_decode(&shape, &data, prefix, &config)
        }
        Commands::WireType { shape } => cmd_wire_type(&shape),
        Commands::Compact { action } => match action {
            CompactAction::Encode { n } => cmd_compact_encode(&n),
            CompactAction::Decode { hex } => cmd_compact_decode(&hex),
        },
        Commands::Test { fixtures, filter } => cmd_test::run(&fixtures, filter.as_deref()),
        Commands::Bench { value, iterations } => cmd_bench(&value, iterations, &config),
    }
}

// ─── Argument helpers ────────────────────────────────────────────────────────

/// Inline JSON, or the contents of a file when the argument starts with `@`.
fn read_json_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("cannot read '{path}'")),
        None => Ok(arg.to_string()),
    }
}

fn parse_value(arg: &str) -> Result<Value> {
    serde_json::from_str(&read_json_arg(arg)?).context("invalid value JSON")
}

fn parse_shape(arg: &str) -> Result<Shape> {
    serde_json::from_str(&read_json_arg(arg)?).context("invalid shape JSON")
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).with_context(|| format!("invalid hex '{s}'"))
}

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_encode(value: &str, config: &CliConfig) -> Result<()> {
    let value = parse_value(value)?;
    let encoded = Encoder::new(config.codec.clone()).encode(&value)?;
    print_json(&json!({
        "shape": value.shape().to_string(),
        "wire_type": value.wire_type().to_string(),
        "encoded": to_hex(&encoded),
        "len": encoded.len(),
    }))
}

fn cmd_decode(shape: &str, data: &[String], prefix: bool, config: &CliConfig) -> Result<()> {
    let shape = parse_shape(shape)?;
    let payloads = data.iter().map(|d| parse_hex(d)).collect::<Result<Vec<_>>>()?;

    if prefix {
        let decoder = Decoder::new(config.codec.clone());
        let mut out = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            let (value, consumed) = decoder.decode_prefix(&shape, payload)?;
            out.push(json!({ "value": value, "consumed": consumed, "remaining": payload.len() - consumed }));
        }
        return print_json(&single_or_array(out));
    }

    if let [payload] = payloads.as_slice() {
        let value = Decoder::new(config.codec.clone()).decode(&shape, payload)?;
        return print_json(&serde_json::to_value(value)?);
    }

    let results = decode_batch(&shape, &payloads, &config.codec);
    let out: Vec<_> = results
        .into_iter()
        .map(|r| match r {
            Ok(value) => json!({ "ok": value }),
            Err(e) => json!({ "error": e.to_string() }),
        })
        .collect();
    print_json(&serde_json::Value::Array(out))
}

fn single_or_array(mut items: Vec<serde_json::Value>) -> serde_json::Value {
    if items.len() == 1 {
        items.remove(0)
    } else {
        serde_json::Value::Array(items)
    }
}

fn cmd_wire_type(shape: &str) -> Result<()> {
    let shape = parse_shape(shape)?;
    print_json(&json!({
        "shape": shape.to_string(),
        "wire_type": resolve_wire_type(&shape).to_string(),
    }))
}

fn cmd_compact_encode(n: &str) -> Result<()> {
    let n: U256 = n.trim().parse().map_err(|e| anyhow!("invalid integer '{n}': {e}"))?;
    print_json(&json!({ "value": n.to_string(), "encoded": to_hex(&encode_compact(n)) }))
}

fn cmd_compact_decode(hex: &str) -> Result<()> {
    let bytes = parse_hex(hex)?;
    let (n, consumed) = decode_compact(&bytes, 0)?;
    print_json(&json!({ "value": n.to_string(), "consumed": consumed }))
}

fn cmd_bench(value: &str, iterations: usize, config: &CliConfig) -> Result<()> {
    if iterations == 0 {
        bail!("--iterations must be positive");
    }
    let value = parse_value(value)?;
    let values = vec![value.clone(); iterations];

    let start = std::time::Instant::now();
    let (encoded, errors) = partition_results(encode_batch(&values, &config.codec));
    let encode_time = start.elapsed();
    if let Some((idx, e)) = errors.into_iter().next() {
        bail!("encode failed at item {idx}: {e}");
    }

    let start = std::time::Instant::now();
    let (_, errors) = partition_results(decode_batch(&value.shape(), &encoded, &config.codec));
    let decode_time = start.elapsed();
    if let Some((idx, e)) = errors.into_iter().next() {
        bail!("decode failed at item {idx}: {e}");
    }

    let per_sec = |d: std::time::Duration| iterations as f64 / d.as_secs_f64().max(f64::EPSILON);
    print_json(&json!({
        "iterations": iterations,
        "payload_len": encoded.first().map_or(0, Vec::len),
        "encode_ms": encode_time.as_secs_f64() * 1e3,
        "decode_ms": decode_time.as_secs_f64() * 1e3,
        "encode_per_sec": per_sec(encode_time).round(),
        "decode_per_sec": per_sec(decode_time).round(),
    }))
}
