//! Main entry point for the varpipe CLI.

use clap::{command, Args, Parser, Subcommand};

use varpipe::{annotate, common, report};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Variant report rows and large deletion calls for drug-resistance panels"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotation related commands.
    Annotate(Annotate),
    /// Report related commands.
    Report(Report),
}

/// Parsing of "annotate *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Annotate {
    /// The sub command to run
    #[command(subcommand)]
    command: AnnotateCommands,
}

/// Enum supporting the parsing of "annotate *" sub commands.
#[derive(Debug, Subcommand)]
enum AnnotateCommands {
    Seqvars(annotate::seqvars::Args),
    Strucvars(annotate::strucvars::Args),
}

/// Parsing of "report *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Report {
    /// The sub command to run
    #[command(subcommand)]
    command: ReportCommands,
}

/// Enum supporting the parsing of "report *" sub commands.
#[derive(Debug, Subcommand)]
enum ReportCommands {
    Summary(report::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || {
        tracing::info!("varpipe {} startup", common::version());

        match &cli.command {
            Commands::Annotate(annotate) => match &annotate.command {
                AnnotateCommands::Seqvars(args) => annotate::seqvars::run(&cli.common, args)?,
                AnnotateCommands::Strucvars(args) => annotate::strucvars::run(&cli.common, args)?,
            },
            Commands::Report(report) => match &report.command {
                ReportCommands::Summary(args) => report::run(&cli.common, args)?,
            },
        }

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
