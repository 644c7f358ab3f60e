//! # ra-pipeline: long-read de novo assembly orchestration
//!
//! This library drives three external tools through a fixed sequence of
//! stages to turn raw long reads into a polished assembly:
//!
//! - **minimap2** finds all-vs-all read overlaps and maps reads onto assemblies
//! - **rala** lays out a draft assembly from reads and overlaps
//! - **racon** computes consensus, twice with the long reads and optionally
//!   once more with short reads
//!
//! The tools are black boxes. The library decides stage order and arguments,
//! keeps intermediate files in an ephemeral working directory, checks that each
//! stage's inputs exist before running it, and stops at the first failure.
//!
//! ## Example Usage
//!
//! ```no_run
//! # use anyhow::Result;
//! # fn main() -> Result<()> {
//! use ra_pipeline::{Pipeline, PipelineRun, Technology, ToolPaths};
//!
//! let run = PipelineRun::builder("reads.fastq", Technology::Ont)
//!     .num_threads(8)
//!     .output("assembly.fasta")
//!     .build()?;
//!
//! let mut pipeline = Pipeline::new(run, ToolPaths::discover()?);
//! let summary = pipeline.run()?;
//! println!("stages: {:?}", summary.stages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `config`: run parameters and their validation
//! - `binary_finder`: locating the external tools
//! - `workdir`: the self-removing working directory
//! - `artifact`: file names of intermediate results
//! - `invoker`: running one tool and classifying its exit
//! - `stages`: the stage list built from the run parameters
//! - `pipeline`: the driver tying it together
//! - `interrupt`: SIGINT/SIGTERM handling so cleanup still happens
//!
//! Runs are strictly sequential. The only parallelism is inside the tools,
//! controlled by the thread count forwarded to each of them.

pub mod artifact;
pub mod binary_finder;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod invoker;
pub mod pipeline;
pub mod stages;
pub mod workdir;

pub use artifact::{artifact_path, ArtifactKind};
pub use binary_finder::{Tool, ToolPaths};
pub use config::{PipelineRun, PipelineRunBuilder, Technology};
pub use error::{PipelineError, Result, ToolError};
pub use pipeline::{run, Pipeline, RunState, RunSummary};
pub use stages::{build_stages, Stage, StageKind, Step};
pub use workdir::WorkingDirectory;
