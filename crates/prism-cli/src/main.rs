//! prism-score
//!
//! Command-line front end for the PRISM scoring engine. Results go to stdout
//! as JSON; logs go to stderr.
//!
//! # Commands
//!
//! - `score`: score one session of answers
//! - `fc-tally`: tally forced-choice block responses

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use prism_common::config::CONFIG_ENV_VAR;
use prism_common::EngineConfig;
use prism_scoring::fc_tally::{tally_responses, FcBasis, FcOption, FcResponse};
use prism_scoring::{score_assessment, ScoreInput};

#[derive(Parser)]
#[command(name = "prism-score")]
#[command(version)]
#[command(about = "Score PRISM assessment sessions")]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a session: answers, key records and optional forced-choice seed
    Score {
        /// JSON file holding `answers`, `key_by_q`, optional `fc_init` and `session_id`
        #[arg(short, long)]
        input: PathBuf,

        /// Engine config (.yaml, .json or .toml); falls back to PRISM_CONFIG, then defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Tally forced-choice block responses
    FcTally {
        /// JSON array of options `{id, block_id, option_code, weights_json}`
        #[arg(long)]
        options: PathBuf,

        /// JSON array of responses `{block_id, option_id}`
        #[arg(long)]
        responses: PathBuf,

        #[arg(long, value_enum, default_value_t = Basis::Functions)]
        basis: Basis,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Basis {
    Functions,
    Types,
}

impl From<Basis> for FcBasis {
    fn from(b: Basis) -> Self {
        match b {
            Basis::Functions => FcBasis::Functions,
            Basis::Types     => FcBasis::Types,
        }
    }
}

#[derive(Serialize)]
struct FcTallyOutput {
    basis: FcBasis,
    scores: std::collections::BTreeMap<String, f64>,
    blocks_answered: u32,
    unknown_options: u32,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(p) => EngineConfig::load(p).with_context(|| format!("loading config {}", p.display()))?,
        None => EngineConfig::discover().context("loading config from PRISM_CONFIG")?,
    };
    Ok(config)
}

/// Whether a config file should replace the one embedded in the input.
/// An empty `PRISM_CONFIG` counts as unset.
fn config_requested(flag: Option<&Path>, env_path: Option<&OsStr>) -> bool {
    flag.is_some() || env_path.is_some_and(|p| !p.is_empty())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Score { input, config } => {
            let mut session: ScoreInput = read_json(&input)?;
            // an explicit config file wins over one embedded in the input
            let env_path = std::env::var_os(CONFIG_ENV_VAR);
            if config_requested(config.as_deref(), env_path.as_deref()) {
                session.config = load_config(config.as_deref())?;
            }
            info!(
                answers = session.answers.len(),
                keys = session.key_by_q.len(),
                "scoring session"
            );
            let result = score_assessment(&session);
            info!(type_code = %result.profile.type_code, gap = result.gap_to_second, "scored");
            print_json(&result, cli.pretty)
        }
        Commands::FcTally { options, responses, basis } => {
            let options: Vec<FcOption> = read_json(&options)?;
            let responses: Vec<FcResponse> = read_json(&responses)?;
            let tally = tally_responses(&options, &responses);
            let basis = FcBasis::from(basis);
            let output = FcTallyOutput {
                basis,
                scores: tally.scores(basis),
                blocks_answered: tally.blocks_answered,
                unknown_options: tally.unknown_options,
            };
            print_json(&output, cli.pretty)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prism=info")),
        1 => EnvFilter::new("prism=debug"),
        _ => EnvFilter::new("prism=trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fc_tally_basis() {
        let cli = Cli::try_parse_from([
            "prism-score", "fc-tally", "--options", "o.json", "--responses", "r.json", "--basis", "types",
        ])
        .unwrap();
        match cli.command {
            Commands::FcTally { basis, .. } => assert_eq!(FcBasis::from(basis), FcBasis::Types),
            _ => panic!("expected fc-tally"),
        }
    }

    #[test]
    fn test_empty_env_path_keeps_embedded_config() {
        assert!(!config_requested(None, None));
        assert!(!config_requested(None, Some(OsStr::new(""))));
        assert!(config_requested(None, Some(OsStr::new("engine.yaml"))));
        assert!(config_requested(Some(Path::new("engine.toml")), Some(OsStr::new(""))));
    }

    #[test]
    fn test_parse_score_with_pretty() {
        let cli = Cli::try_parse_from(["prism-score", "score", "--input", "a.json", "--pretty"]).unwrap();
        assert!(cli.pretty);
        assert!(matches!(cli.command, Commands::Score { config: None, .. }));
    }
}
