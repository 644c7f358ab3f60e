//! Run parameters for an assembly.
//!
//! A [`PipelineRun`] is built once from user input through [`PipelineRunBuilder`],
//! validated in `build()`, and stays immutable for the duration of the run.

use crate::error::{PipelineError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Sequencing technology of the primary (long) reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technology {
    /// Oxford Nanopore
    Ont,
    /// PacBio
    PacBio,
}

impl Technology {
    /// Aligner preset for all-vs-all overlap detection.
    pub fn overlap_preset(self) -> &'static str {
        match self {
            Technology::Ont => "ava-ont",
            Technology::PacBio => "ava-pb",
        }
    }

    /// Aligner preset for mapping reads onto an assembly.
    pub fn mapping_preset(self) -> &'static str {
        match self {
            Technology::Ont => "map-ont",
            Technology::PacBio => "map-pb",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Technology::Ont => "ont",
            Technology::PacBio => "pb",
        }
    }
}

impl FromStr for Technology {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ont" => Ok(Technology::Ont),
            "pb" => Ok(Technology::PacBio),
            other => Err(PipelineError::Input(format!(
                "unknown sequencing technology '{other}' (expected 'ont' or 'pb')"
            ))),
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single pipeline execution.
///
/// # Default Values
/// - `secondary`: None (no short-read polishing)
/// - `include_unused`: false
/// - `num_threads`: Number of CPU cores
/// - `output`: `<primary stem>.consensus.fasta` in the current directory
/// - `work_root`: system temp directory
/// - `keep_intermediates`: false
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Long-read sequence file
    pub primary: PathBuf,

    /// Sequencing technology of the primary reads
    pub technology: Technology,

    /// Short-read sequence file used for the final polishing round
    pub secondary: Option<PathBuf>,

    /// Keep unassembled and unpolished sequences in layout and consensus output
    pub include_unused: bool,

    /// Thread count forwarded to every external tool
    pub num_threads: usize,

    /// Where the final consensus is written
    pub output: PathBuf,

    /// Parent directory for the ephemeral working directory
    pub work_root: Option<PathBuf>,

    /// Keep the working directory after the run for debugging
    pub keep_intermediates: bool,
}

impl PipelineRun {
    /// Creates a builder for the given primary reads and technology.
    ///
    /// # Example
    /// ```no_run
    /// # use ra_pipeline::error::Result;
    /// # fn main() -> Result<()> {
    /// use ra_pipeline::{PipelineRun, Technology};
    ///
    /// let run = PipelineRun::builder("reads.fastq", Technology::Ont)
    ///     .num_threads(8)
    ///     .secondary("illumina.fastq")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(primary: impl Into<PathBuf>, technology: Technology) -> PipelineRunBuilder {
        PipelineRunBuilder {
            primary: primary.into(),
            technology,
            secondary: None,
            include_unused: false,
            num_threads: num_cpus::get().max(1),
            output: None,
            work_root: None,
            keep_intermediates: false,
        }
    }

    /// Whether the short-read polishing stage is part of this run.
    pub fn has_polish(&self) -> bool {
        self.secondary.is_some()
    }
}

/// Builder for [`PipelineRun`].
#[derive(Debug, Clone)]
pub struct PipelineRunBuilder {
    primary: PathBuf,
    technology: Technology,
    secondary: Option<PathBuf>,
    include_unused: bool,
    num_threads: usize,
    output: Option<PathBuf>,
    work_root: Option<PathBuf>,
    keep_intermediates: bool,
}

impl PipelineRunBuilder {
    /// Sets the short-read file; enables the polishing stage.
    pub fn secondary(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary = Some(path.into());
        self
    }

    /// Forwards the "include unused" flag to layout and consensus.
    pub fn include_unused(mut self, include: bool) -> Self {
        self.include_unused = include;
        self
    }

    /// Sets the number of threads handed to the external tools.
    ///
    /// Default: Number of CPU cores. Zero is rejected by `build()`.
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn work_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_root = Some(path.into());
        self
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    /// Validates the parameters and produces the run.
    pub fn build(self) -> Result<PipelineRun> {
        require_file(&self.primary, "primary sequences")?;
        if let Some(ref secondary) = self.secondary {
            require_file(secondary, "secondary sequences")?;
        }

        if self.num_threads == 0 {
            return Err(PipelineError::Input(
                "number of threads must be positive".to_string(),
            ));
        }

        let output = match self.output {
            Some(path) => path,
            None => default_output_path(&self.primary),
        };
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(PipelineError::Input(format!(
                    "output directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        if output.is_dir() {
            return Err(PipelineError::Input(format!(
                "output path is a directory: {}",
                output.display()
            )));
        }

        if let Some(ref root) = self.work_root {
            if !root.is_dir() {
                return Err(PipelineError::Input(format!(
                    "working directory root does not exist: {}",
                    root.display()
                )));
            }
        }

        Ok(PipelineRun {
            primary: self.primary,
            technology: self.technology,
            secondary: self.secondary,
            include_unused: self.include_unused,
            num_threads: self.num_threads,
            output,
            work_root: self.work_root,
            keep_intermediates: self.keep_intermediates,
        })
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(PipelineError::Input(format!(
            "non-existent {what} file: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(PipelineError::Input(format!(
            "{what} path is not a regular file: {}",
            path.display()
        )));
    }
    Ok(())
}

const SEQUENCE_SUFFIXES: &[&str] = &[".fasta", ".fastq", ".fna", ".fa", ".fq"];

/// Default output file for a primary read set: `<stem>.consensus.fasta` in
/// the current directory.
///
/// Compression and sequence-format suffixes are stripped, so
/// `reads.fastq.gz` becomes `reads.consensus.fasta`.
pub fn default_output_path(primary: &Path) -> PathBuf {
    let name = primary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut stem = name.strip_suffix(".gz").unwrap_or(&name);
    for suffix in SEQUENCE_SUFFIXES {
        if let Some(stripped) = stem.strip_suffix(suffix) {
            stem = stripped;
            break;
        }
    }
    if stem.is_empty() {
        stem = "ra";
    }

    PathBuf::from(format!("{stem}.consensus.fasta"))
}
