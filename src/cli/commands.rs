use crate::config::parse_provider;
use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// Grades free-response answers against a question's rubric
#[derive(Parser, Debug)]
#[command(
    name = "frq-grader",
    about = "Grades free-response answers with an LLM judgment and a deterministic fallback",
    version,
    author,
    long_about = "frq-grader scores student answers to multi-part free-response questions. \
                  Each request is judged once by the configured LLM provider (Ollama, OpenAI, \
                  Anthropic, Gemini, Groq, xAI, DeepSeek); if the judgment is unavailable or \
                  unusable a keyword heuristic grades the answers instead."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Grade one request or an array of requests",
        long_about = "Reads a grading request (or a JSON array of requests) and prints the \
                      graded result. Arrays are graded concurrently and printed in input order.\n\n\
                      Examples:\n  \
                      frq-grader grade request.json\n  \
                      cat request.json | frq-grader grade --format human\n  \
                      frq-grader grade batch.json --fallback-only -o results.json\n  \
                      frq-grader grade request.json --provider openai --model gpt-4o-mini"
    )]
    Grade(GradeArgs),

    #[command(
        about = "Check judgment provider availability",
        long_about = "Reports the configured provider and model and whether a judgment client \
                      can be reached.\n\n\
                      Examples:\n  \
                      frq-grader health\n  \
                      frq-grader health --provider ollama --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GradeArgs {
    #[arg(
        value_name = "FILE",
        help = "Request file (JSON object or array); reads stdin when omitted or '-'"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Skip the judgment service and use the fallback grader")]
    pub fallback_only: bool,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Judgment timeout in seconds (overrides FRQ_GRADER_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "Judgment provider (overrides FRQ_GRADER_PROVIDER)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name to use (provider-specific, e.g., 'qwen2.5:7b' for Ollama)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Append judgment attempts to this JSON-lines file"
    )]
    pub journal: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "Provider to check (defaults to the configured one)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Pretty,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Pretty => super::output::OutputFormat::Pretty,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    parse_provider(s).map_err(|e| e.to_string())
}
