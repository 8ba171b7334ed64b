//! CLI argument definitions for the migration engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "migrate",
    version,
    about = "Intelligent migration engine - profile sources and suggest schema mappings",
    long_about = "Profile tabular source exports, suggest mappings into the destination\n\
                  schema with per-column confidence, and learn from reviewed migrations."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Profile a source file and print its column fingerprint.
    Profile(ProfileArgs),

    /// Profile a source and suggest mappings into the target schema.
    Suggest(SuggestArgs),

    /// Apply reviewed mapping decisions and record them to the corpus.
    Confirm(ConfirmArgs),

    /// List the migrations recorded in the historical corpus.
    History(HistoryArgs),
}

#[derive(Parser)]
pub struct ProfileArgs {
    /// Path to the source CSV export.
    #[arg(value_name = "SOURCE_CSV")]
    pub source: PathBuf,

    #[command(flatten)]
    pub source_opts: SourceOpts,

    /// Write the source DNA as JSON to this path.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print raw sample values. Off by default because samples may contain
    /// PHI/PII; leave unset to keep them redacted.
    #[arg(long = "show-samples")]
    pub show_samples: bool,
}

#[derive(Parser)]
pub struct SuggestArgs {
    /// Path to the source CSV export.
    #[arg(value_name = "SOURCE_CSV")]
    pub source: PathBuf,

    #[command(flatten)]
    pub source_opts: SourceOpts,

    #[command(flatten)]
    pub engine_opts: EngineOpts,

    /// Write the full review payload as JSON to this path.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConfirmArgs {
    /// Path to the source CSV export.
    #[arg(value_name = "SOURCE_CSV")]
    pub source: PathBuf,

    /// JSON file with the reviewed mapping decisions.
    #[arg(long = "decisions", value_name = "PATH")]
    pub decisions: PathBuf,

    #[command(flatten)]
    pub source_opts: SourceOpts,

    #[command(flatten)]
    pub engine_opts: EngineOpts,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Directory holding the historical corpus.
    #[arg(long = "corpus-dir", value_name = "DIR", default_value = "corpus")]
    pub corpus_dir: PathBuf,
}

/// Provenance flags shared by every source-reading command.
#[derive(Parser)]
pub struct SourceOpts {
    /// Originating system label recorded with the profile (e.g. EPIC).
    #[arg(long = "source-system", value_name = "NAME", default_value = "unknown")]
    pub source_system: String,
}

/// Scoring inputs shared by suggest and confirm.
#[derive(Parser)]
pub struct EngineOpts {
    /// Directory holding the historical corpus.
    #[arg(long = "corpus-dir", value_name = "DIR", default_value = "corpus")]
    pub corpus_dir: PathBuf,

    /// Score without the historical corpus.
    #[arg(long = "no-corpus")]
    pub no_corpus: bool,

    /// Target schema JSON (defaults to the built-in healthcare schema).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Pattern affinity table JSON (defaults to the built-in table).
    #[arg(long = "affinity", value_name = "PATH")]
    pub affinity: Option<PathBuf>,

    /// Suggestions below this confidence resolve to UNMAPPED.
    #[arg(long = "min-confidence", value_name = "FLOAT")]
    pub min_confidence: Option<f32>,

    /// How many similar past migrations inform the historical prior.
    #[arg(long = "top-k", value_name = "N")]
    pub top_k: Option<usize>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
