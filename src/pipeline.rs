//! Top-level driver of an assembly run
//!
//! Acquires the working directory, builds the stage list and runs it in
//! order, stopping at the first failure. The directory is released on every
//! way out of [`Pipeline::run`].

use crate::binary_finder::ToolPaths;
use crate::config::PipelineRun;
use crate::error::{PipelineError, Result, ToolError};
use crate::interrupt;
use crate::invoker::ToolInvoker;
use crate::stages::{build_stages, Stage, Step};
use crate::workdir::WorkingDirectory;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    /// Executing the stage at this index
    Running(usize),
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Names of the stages that ran, in order
    pub stages: Vec<String>,
    pub output: PathBuf,
}

/// Orchestrates one run over a fixed set of tools.
#[derive(Debug)]
pub struct Pipeline {
    run: PipelineRun,
    invoker: ToolInvoker,
    state: RunState,
}

impl Pipeline {
    pub fn new(run: PipelineRun, tools: ToolPaths) -> Self {
        Self {
            run,
            invoker: ToolInvoker::new(tools),
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The stages a run would execute, with artifacts placed under `work_dir`.
    ///
    /// Nothing is executed or created.
    pub fn plan(&self, work_dir: &Path) -> Vec<Stage> {
        build_stages(&self.run, work_dir)
    }

    /// Executes all stages.
    ///
    /// Can be called once; later calls fail without doing anything.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.state != RunState::NotStarted {
            return Err(PipelineError::Input(
                "pipeline has already been run".to_string(),
            ));
        }

        info!(
            primary = %self.run.primary.display(),
            technology = %self.run.technology,
            threads = self.run.num_threads,
            polish = self.run.has_polish(),
            "starting assembly"
        );

        let work = match WorkingDirectory::acquire(self.run.work_root.as_deref()) {
            Ok(work) => work.keep_on_release(self.run.keep_intermediates),
            Err(e) => {
                self.state = RunState::Failed;
                return Err(e);
            }
        };

        let stages = build_stages(&self.run, work.path());
        let result = self.execute(&stages);

        self.state = match result {
            Ok(_) => RunState::Succeeded,
            Err(_) => RunState::Failed,
        };
        work.release();

        if let Ok(ref summary) = result {
            info!(output = %summary.output.display(), "assembly complete");
        }
        result
    }

    fn execute(&mut self, stages: &[Stage]) -> Result<RunSummary> {
        let mut completed = Vec::with_capacity(stages.len());

        for stage in stages {
            self.state = RunState::Running(stage.index);
            let name = stage.name();
            let started = Instant::now();
            info!(stage = %name, "[{}/{}] running", stage.index + 1, stages.len());

            for step in &stage.steps {
                self.run_step(&name, step)?;
            }

            info!(
                stage = %name,
                elapsed_secs = started.elapsed().as_secs(),
                "finished"
            );
            completed.push(name);
        }

        Ok(RunSummary {
            stages: completed,
            output: self.run.output.clone(),
        })
    }

    fn run_step(&self, stage: &str, step: &Step) -> Result<()> {
        if interrupt::is_requested() {
            return Err(PipelineError::Interrupted);
        }

        if let Some(path) = step.missing_input() {
            return Err(PipelineError::MissingArtifact {
                stage: stage.to_string(),
                path: path.to_path_buf(),
            });
        }

        debug!(stage, command = %step, "invoking");

        match self.invoker.invoke(step.tool, &step.args, &step.stdout) {
            Ok(()) => Ok(()),
            Err(e) => {
                if step.is_terminal() && !matches!(e, ToolError::SpawnFailed { .. }) {
                    discard_partial_output(&step.output);
                }
                match e {
                    ToolError::Interrupted => Err(PipelineError::Interrupted),
                    source => Err(PipelineError::Tool {
                        stage: stage.to_string(),
                        tool: step.tool.binary_name(),
                        source,
                    }),
                }
            }
        }
    }
}

fn discard_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial output"),
    }
}

/// Runs a complete assembly with the given tools.
pub fn run(run: PipelineRun, tools: ToolPaths) -> Result<RunSummary> {
    Pipeline::new(run, tools).run()
}
