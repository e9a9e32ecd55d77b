//! efgen CLI: test-matrix generation and FPGA builds for Chisel designs.
//!
//! Provides `efgen fpga` for the full test-then-build flow of an FPGA project
//! directory, `efgen test` for running only its cocotb test matrix, and
//! `efgen plan` for inspecting the expansion without running anything.

#![warn(missing_docs)]

mod fpga;
mod plan;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// efgen: Chisel module test matrices under cocotb.
#[derive(Parser, Debug)]
#[command(name = "efgen", version, about = "Chisel/cocotb test matrix generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test and/or build an FPGA project.
    Fpga(FpgaArgs),
    /// Generate and run the cocotb test matrix of an FPGA project.
    Test(TestArgs),
    /// Print the expanded test matrix without generating or running anything.
    Plan(PlanArgs),
}

/// Arguments for the `efgen fpga` subcommand.
#[derive(Parser, Debug)]
pub struct FpgaArgs {
    /// FPGA project directory containing `build.toml`.
    #[arg(long)]
    pub dir: PathBuf,

    /// Generate and run the test matrix before building.
    #[arg(long, alias = "enable-test")]
    pub test: bool,

    /// Elaborate the top module and build the bitstream.
    #[arg(long, alias = "enable-build")]
    pub build: bool,

    /// Generate files but only print the external commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Worker processes for the test runner (default: available CPUs).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `efgen test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// FPGA project directory containing `build.toml`.
    #[arg(long)]
    pub dir: PathBuf,

    /// Generate files but only print the external commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Worker processes for the test runner (default: available CPUs).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `efgen plan` subcommand.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// FPGA project directory containing `build.toml`.
    #[arg(long)]
    pub dir: PathBuf,

    /// Output format for the plan.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Plan output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Command::Fpga(ref args) => fpga::run(args),
        Command::Test(ref args) => fpga::run(&FpgaArgs {
            dir: args.dir.clone(),
            test: true,
            build: false,
            dry_run: args.dry_run,
            jobs: args.jobs,
        }),
        Command::Plan(ref args) => plan::run(args),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(e.exit_code());
        }
    }
}

/// Sets up `env_logger` on stderr. `RUST_LOG` overrides the flag-derived level.
fn init_logging(quiet: bool, verbose: bool) {
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(log_level(quiet, verbose))
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn log_level(quiet: bool, verbose: bool) -> log::LevelFilter {
    if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
