use anyhow::{Context, Result};
use clap::Parser;
use ra_pipeline::{interrupt, Pipeline, PipelineRun, Technology, Tool, ToolPaths};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// De novo genome assembly from long reads: overlap, layout and consensus.
#[derive(Parser, Debug)]
#[command(name = "ra", version, about)]
struct Cli {
    /// Long reads (FASTA/FASTQ, optionally gzipped)
    #[arg(value_name = "SEQUENCES")]
    sequences: PathBuf,

    /// Sequencing technology of the long reads: ont or pb
    #[arg(short = 'x', long = "technology", value_name = "TECH", value_parser = parse_technology)]
    technology: Technology,

    /// Short reads used for a final polishing round
    #[arg(short = 's', long = "short-reads", value_name = "FILE")]
    short_reads: Option<PathBuf>,

    /// Keep unassembled and unpolished sequences in the output
    #[arg(short = 'u', long = "include-unused")]
    include_unused: bool,

    /// Threads handed to each tool [default: number of CPUs]
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,

    /// Output file [default: <sequences stem>.consensus.fasta]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory in which the working directory is created [default: $TMPDIR]
    #[arg(long = "work-dir", value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Keep intermediate files after the run
    #[arg(long = "keep-intermediates")]
    keep_intermediates: bool,

    /// Print the commands that would run and exit
    #[arg(long = "dry-run")]
    dry_run: bool,
}

fn parse_technology(s: &str) -> std::result::Result<Technology, String> {
    s.parse::<Technology>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut builder = PipelineRun::builder(&cli.sequences, cli.technology)
        .include_unused(cli.include_unused)
        .keep_intermediates(cli.keep_intermediates);
    if let Some(short_reads) = cli.short_reads {
        builder = builder.secondary(short_reads);
    }
    if let Some(threads) = cli.threads {
        builder = builder.num_threads(threads);
    }
    if let Some(output) = cli.output {
        builder = builder.output(output);
    }
    if let Some(work_dir) = cli.work_dir {
        builder = builder.work_root(work_dir);
    }
    let params = builder.build()?;

    // Planning only renders command lines; the tools need not be installed
    let tools = if cli.dry_run {
        ToolPaths::new(
            Tool::Aligner.binary_name(),
            Tool::Layout.binary_name(),
            Tool::Consensus.binary_name(),
        )
    } else {
        ToolPaths::discover()?
    };
    let mut pipeline = Pipeline::new(params, tools);

    if cli.dry_run {
        for stage in pipeline.plan(&PathBuf::from("<work-dir>")) {
            println!("# {}", stage.name());
            for step in &stage.steps {
                println!("{step}");
            }
        }
        return Ok(());
    }

    interrupt::install_handlers().context("failed to install signal handlers")?;

    pipeline.run()?;
    Ok(())
}
