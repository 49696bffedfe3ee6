pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, GradeArgs, HealthArgs};
pub use output::{OutputFormat, OutputFormatter};
