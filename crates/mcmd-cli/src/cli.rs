use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Haydar Mehryar",
    version,
    about = "mcmd - Prepares and coordinates coupled NAMD (molecular dynamics) and GOMC (Monte Carlo) simulation cycles.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Append logs to a file (`--log-file=PATH`) in addition to the console output.
    /// A directory, or the bare flag meaning `logs`, receives `mcmd.log`.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = mcmd::engine::config::DEFAULT_LOG_DIR
    )]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used when both boxes run their MD step together.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a simulation input file and show the values derived from it.
    Check(CheckArgs),
    /// Write the NAMD input files of one cycle.
    Prepare(PrepareArgs),
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the simulation input file (JSON with `//` comments, or TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the validated configuration, with every default filled in, as JSON.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Set a specific configuration value, overriding the input file.
    /// Can be used multiple times. Example: -S namd_run_steps=5000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Path to the simulation input file (JSON with `//` comments, or TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Cycle to prepare. Defaults to `starting_at_cycle_namd_gomc_sims`.
    #[arg(long, value_name = "INT")]
    pub cycle: Option<u64>,

    /// Set a specific configuration value, overriding the input file.
    /// Can be used multiple times. Example: -S no_core_box_0=8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_log_file_flag_targets_the_default_log_dir() {
        let cli = Cli::try_parse_from(["mcmd", "--log-file", "check", "-c", "run.json"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("logs")));
        assert!(matches!(cli.command, Commands::Check(_)));

        let cli =
            Cli::try_parse_from(["mcmd", "--log-file=out/run.log", "check", "-c", "run.json"])
                .unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("out/run.log")));

        let cli = Cli::try_parse_from(["mcmd", "check", "-c", "run.json"]).unwrap();
        assert_eq!(cli.log_file, None);
    }
}
