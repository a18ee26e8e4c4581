//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for planning results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Status, verdict and per-iteration vote breakdown
    Full,
    /// Only the final plan
    Plan,
    /// JSON output
    Json,
}

impl From<OutputFormat> for planner_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => planner_domain::OutputFormat::Full,
            OutputFormat::Plan => planner_domain::OutputFormat::Plan,
            OutputFormat::Json => planner_domain::OutputFormat::Json,
        }
    }
}

/// Completion provider to plan with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Anthropic,
    Openai,
}

impl ProviderArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderArg::Anthropic => "anthropic",
            ProviderArg::Openai => "openai",
        }
    }
}

/// CLI arguments for self-critique-planner
#[derive(Parser, Debug)]
#[command(name = "self-critique-planner")]
#[command(author, version, about = "LLM planner that critiques and votes on its own plans")]
#[command(long_about = r#"
Self-Critique Planner asks an LLM for a plan, then has the same LLM check
that plan step by step several times and takes a majority vote.

Each iteration has three phases:
1. Plan Generation: one completion produces a numbered list of actions
2. Self-Critique: N independent critiques verify each action's preconditions
3. Vote: the majority verdict accepts the plan or feeds the error back

Configuration is merged from (highest priority first):
1. PLANNER_* environment variables (e.g. PLANNER_PLANNING__SAMPLES_PER_ITERATION=7)
2. --config <path>     Explicit config file
3. ./planner.toml      Project-level config
4. ~/.config/self-critique-planner/config.toml   Global config

Example:
  self-critique-planner domain.pddl problem.pddl
  self-critique-planner -n 3 -s 7 --provider openai domain.pddl problem.pddl
  self-critique-planner --output json --history-log run.jsonl domain.pddl problem.pddl
"#)]
pub struct Cli {
    /// File with the formal domain description
    #[arg(value_name = "DOMAIN_FILE", required_unless_present_any = ["show_config", "print_default_config"])]
    pub domain: Option<PathBuf>,

    /// File with the problem description
    #[arg(value_name = "PROBLEM_FILE", required_unless_present_any = ["show_config", "print_default_config"])]
    pub problem: Option<PathBuf>,

    /// Maximum generate/critique iterations
    #[arg(short = 'n', long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Critique samples per iteration
    #[arg(short, long, value_name = "N")]
    pub samples: Option<usize>,

    /// Successful critique samples required to hold a vote
    #[arg(long, value_name = "N")]
    pub min_samples: Option<usize>,

    /// Completion provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model override passed to the provider
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Output format (default: config value, then "full")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Append one JSON line per completed iteration to this file
    #[arg(long, value_name = "PATH")]
    pub history_log: Option<PathBuf>,

    /// Write every prompt, completion and vote as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub transcript_log: Option<PathBuf>,

    /// Also write tracing logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Per-call deadline in seconds for each completion
    #[arg(long, value_name = "SECS")]
    pub sample_timeout: Option<u64>,

    /// Cancel the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,
}
