//! Stage sequence of an assembly run.
//!
//! [`build_stages`] turns a [`PipelineRun`] into the complete, ordered list
//! of stages before anything executes:
//!
//! 1. overlap: all-vs-all alignment of the primary reads
//! 2. layout: draft assembly from reads and overlaps
//! 3. consensus-1: map reads onto the draft, then polish it
//! 4. consensus-2: map reads onto consensus-1, then polish it
//! 5. polish: map short reads onto consensus-2, then polish it (only with
//!    secondary sequences)
//!
//! The last step of the last stage writes the run's output file itself; all
//! other steps write an artifact in the working directory through stdout.

use crate::artifact::{artifact_path, ArtifactKind};
use crate::binary_finder::Tool;
use crate::config::PipelineRun;
use crate::invoker::StdoutTarget;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of long-read consensus rounds.
pub const CONSENSUS_ROUNDS: usize = 2;

/// Aligner preset for short reads.
const SHORT_READ_PRESET: &str = "sr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Overlap,
    Layout,
    /// Long-read consensus round, starting at 1
    Consensus(usize),
    Polish,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Overlap => f.write_str("overlap"),
            StageKind::Layout => f.write_str("layout"),
            StageKind::Consensus(round) => write!(f, "consensus-{round}"),
            StageKind::Polish => f.write_str("polish"),
        }
    }
}

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub tool: Tool,
    pub args: Vec<OsString>,
    /// Files that must exist and be non-empty before the step runs
    pub inputs: Vec<PathBuf>,
    pub stdout: StdoutTarget,
    /// File the step produces
    pub output: PathBuf,
}

impl Step {
    /// Whether the step writes the run's output file directly.
    pub fn is_terminal(&self) -> bool {
        self.stdout == StdoutTarget::Inherit
    }

    /// First declared input that is absent or empty.
    pub fn missing_input(&self) -> Option<&Path> {
        self.inputs
            .iter()
            .find(|path| !matches!(std::fs::metadata(path), Ok(meta) if meta.len() > 0))
            .map(PathBuf::as_path)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let StdoutTarget::File(ref path) = self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Position in the sequence, starting at 0
    pub index: usize,
    pub kind: StageKind,
    pub steps: Vec<Step>,
}

impl Stage {
    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    /// File produced by the stage's last step.
    pub fn output(&self) -> &Path {
        self.steps
            .last()
            .map(|step| step.output.as_path())
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn is_terminal(&self) -> bool {
        self.steps.last().is_some_and(Step::is_terminal)
    }
}

/// Where a consensus step puts its result.
enum Destination {
    Artifact(PathBuf),
    Final(PathBuf),
}

/// Builds the ordered stage list for `run` with artifacts under `work_dir`.
pub fn build_stages(run: &PipelineRun, work_dir: &Path) -> Vec<Stage> {
    let builder = StepBuilder { run };
    let mut stages = Vec::with_capacity(CONSENSUS_ROUNDS + 3);

    let overlaps = artifact_path(work_dir, ArtifactKind::Overlaps, 0);
    stages.push(Stage {
        index: stages.len(),
        kind: StageKind::Overlap,
        steps: vec![builder.align(
            run.technology.overlap_preset(),
            &run.primary,
            &run.primary,
            overlaps.clone(),
        )],
    });

    let draft = artifact_path(work_dir, ArtifactKind::Layout, 0);
    stages.push(Stage {
        index: stages.len(),
        kind: StageKind::Layout,
        steps: vec![builder.layout(&overlaps, draft.clone())],
    });

    let mut reference = draft;
    for round in 1..=CONSENSUS_ROUNDS {
        let mappings = artifact_path(work_dir, ArtifactKind::Mappings, round);
        let destination = if round == CONSENSUS_ROUNDS && !run.has_polish() {
            Destination::Final(run.output.clone())
        } else {
            Destination::Artifact(artifact_path(work_dir, ArtifactKind::Consensus, round))
        };

        let map = builder.align(
            run.technology.mapping_preset(),
            &reference,
            &run.primary,
            mappings.clone(),
        );
        let polish = builder.consensus(&run.primary, &mappings, &reference, destination);
        reference = polish.output.clone();

        stages.push(Stage {
            index: stages.len(),
            kind: StageKind::Consensus(round),
            steps: vec![map, polish],
        });
    }

    if let Some(ref secondary) = run.secondary {
        let mappings = artifact_path(work_dir, ArtifactKind::Mappings, CONSENSUS_ROUNDS + 1);
        let map = builder.align(SHORT_READ_PRESET, &reference, secondary, mappings.clone());
        let polish = builder.consensus(
            secondary,
            &mappings,
            &reference,
            Destination::Final(run.output.clone()),
        );

        stages.push(Stage {
            index: stages.len(),
            kind: StageKind::Polish,
            steps: vec![map, polish],
        });
    }

    stages
}

struct StepBuilder<'a> {
    run: &'a PipelineRun,
}

impl StepBuilder<'_> {
    fn common_args(&self, with_unused: bool) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-t"),
            OsString::from(self.run.num_threads.to_string()),
        ];
        if with_unused && self.run.include_unused {
            args.push(OsString::from("-u"));
        }
        args
    }

    /// `minimap2 -t N -x <preset> <target> <query> > out`
    fn align(&self, preset: &str, target: &Path, query: &Path, out: PathBuf) -> Step {
        let mut args = self.common_args(false);
        args.push(OsString::from("-x"));
        args.push(OsString::from(preset));
        args.push(target.as_os_str().to_owned());
        args.push(query.as_os_str().to_owned());

        Step {
            tool: Tool::Aligner,
            args,
            inputs: vec![target.to_path_buf(), query.to_path_buf()],
            stdout: StdoutTarget::File(out.clone()),
            output: out,
        }
    }

    /// `rala -t N [-u] <reads> <overlaps> > out`
    fn layout(&self, overlaps: &Path, out: PathBuf) -> Step {
        let mut args = self.common_args(true);
        args.push(self.run.primary.as_os_str().to_owned());
        args.push(overlaps.as_os_str().to_owned());

        Step {
            tool: Tool::Layout,
            args,
            inputs: vec![self.run.primary.clone(), overlaps.to_path_buf()],
            stdout: StdoutTarget::File(out.clone()),
            output: out,
        }
    }

    /// `racon -t N [-u] <reads> <mappings> <reference> [<output>]`
    fn consensus(
        &self,
        sequences: &Path,
        mappings: &Path,
        reference: &Path,
        destination: Destination,
    ) -> Step {
        let mut args = self.common_args(true);
        args.push(sequences.as_os_str().to_owned());
        args.push(mappings.as_os_str().to_owned());
        args.push(reference.as_os_str().to_owned());

        let inputs = vec![
            sequences.to_path_buf(),
            mappings.to_path_buf(),
            reference.to_path_buf(),
        ];

        match destination {
            Destination::Artifact(out) => Step {
                tool: Tool::Consensus,
                args,
                inputs,
                stdout: StdoutTarget::File(out.clone()),
                output: out,
            },
            Destination::Final(out) => {
                args.push(out.as_os_str().to_owned());
                Step {
                    tool: Tool::Consensus,
                    args,
                    inputs,
                    stdout: StdoutTarget::Inherit,
                    output: out,
                }
            }
        }
    }
}
