use frq_grader::cli::commands::{CliArgs, Commands};
use frq_grader::cli::handlers::{handle_grade, handle_health};
use frq_grader::util::{init_logging, LoggingConfig};
use frq_grader::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("frq-grader v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Grade(grade_args) => handle_grade(grade_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}
