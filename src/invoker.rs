//! Subprocess runner for the external tools
//!
//! One process at a time: spawn, redirect stdout, block until it exits and
//! classify the exit status. Stderr always stays attached to ours so tool
//! diagnostics reach the operator as they happen.

use crate::binary_finder::{Tool, ToolPaths};
use crate::error::ToolError;
use crate::interrupt;
use std::ffi::OsString;
use std::fs::File;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Where a tool's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    /// Redirect into this file, truncating it
    File(PathBuf),
    /// Leave attached to the orchestrator's stdout
    Inherit,
}

/// Runs tools from a fixed set of resolved binaries.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    tools: ToolPaths,
    poll_interval: Duration,
}

impl ToolInvoker {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            poll_interval: Duration::from_millis(50),
        }
    }

    /// Run `tool` with `args` and wait for it.
    ///
    /// The arguments are passed through untouched. Returns once the process
    /// has exited and its output file is closed.
    pub fn invoke(
        &self,
        tool: Tool,
        args: &[OsString],
        stdout: &StdoutTarget,
    ) -> Result<(), ToolError> {
        let program = self.tools.get(tool);

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).stderr(Stdio::inherit());

        match stdout {
            StdoutTarget::File(path) => {
                let file = File::create(path).map_err(|source| ToolError::OutputUnavailable {
                    path: path.clone(),
                    source,
                })?;
                cmd.stdout(Stdio::from(file));
            }
            StdoutTarget::Inherit => {
                cmd.stdout(Stdio::inherit());
            }
        }

        debug!(command = ?cmd, "spawning {tool}");

        let mut child = cmd.spawn().map_err(|source| ToolError::SpawnFailed {
            program: program.clone(),
            source,
        })?;
        // Drop our copy of the redirected stdout handle
        drop(cmd);

        let status = self.wait(&mut child)?;
        classify(status)
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ToolError> {
        loop {
            if let Some(status) = child.try_wait().map_err(ToolError::WaitFailed)? {
                // Ctrl-C reaches the whole process group, so the tool usually
                // dies before the flag is seen below
                if !status.success() && interrupt::is_requested() {
                    return Err(ToolError::Interrupted);
                }
                return Ok(status);
            }
            if interrupt::is_requested() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Interrupted);
            }
            thread::sleep(self.poll_interval);
        }
    }
}

fn classify(status: ExitStatus) -> Result<(), ToolError> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ToolError::NonZeroExit(code)),
        None => Err(ToolError::KilledBySignal(status.signal().unwrap_or(0))),
    }
}
