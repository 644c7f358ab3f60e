//! Locating the external assembly tools
//!
//! The orchestrator never looks tools up itself; it receives a [`ToolPaths`]
//! at construction. [`ToolPaths::discover`] is the default way to build one.

use crate::error::{PipelineError, Result};
use std::fmt;
use std::path::PathBuf;

/// The external programs the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Read aligner used for overlaps and mappings (minimap2)
    Aligner,
    /// Draft assembler (rala)
    Layout,
    /// Consensus/polishing tool (racon)
    Consensus,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Aligner, Tool::Layout, Tool::Consensus];

    /// Executable name searched for on disk.
    pub fn binary_name(self) -> &'static str {
        match self {
            Tool::Aligner => "minimap2",
            Tool::Layout => "rala",
            Tool::Consensus => "racon",
        }
    }

    /// Environment variable that overrides discovery for this tool.
    pub fn env_override(self) -> &'static str {
        match self {
            Tool::Aligner => "RA_MINIMAP2",
            Tool::Layout => "RA_RALA",
            Tool::Consensus => "RA_RACON",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Resolved locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub aligner: PathBuf,
    pub layout: PathBuf,
    pub consensus: PathBuf,
}

impl ToolPaths {
    pub fn new(
        aligner: impl Into<PathBuf>,
        layout: impl Into<PathBuf>,
        consensus: impl Into<PathBuf>,
    ) -> Self {
        Self {
            aligner: aligner.into(),
            layout: layout.into(),
            consensus: consensus.into(),
        }
    }

    /// Finds all three tools with [`find_binary`].
    pub fn discover() -> Result<Self> {
        Ok(Self {
            aligner: find_binary(Tool::Aligner)?,
            layout: find_binary(Tool::Layout)?,
            consensus: find_binary(Tool::Consensus)?,
        })
    }

    pub fn get(&self, tool: Tool) -> &PathBuf {
        match tool {
            Tool::Aligner => &self.aligner,
            Tool::Layout => &self.layout,
            Tool::Consensus => &self.consensus,
        }
    }
}

/// Find a tool binary
///
/// Search order:
/// 1. Per-tool environment override (`RA_MINIMAP2`, `RA_RALA`, `RA_RACON`)
/// 2. Same directory as current executable (tools installed next to `ra`)
/// 3. System PATH
pub fn find_binary(tool: Tool) -> Result<PathBuf> {
    let name = tool.binary_name();

    // 1. Explicit override; trusted as given but must exist
    if let Some(value) = std::env::var_os(tool.env_override()) {
        let path = PathBuf::from(value);
        if path.is_file() {
            return Ok(path);
        }
        return Err(PipelineError::Input(format!(
            "{}={} does not point to an executable",
            tool.env_override(),
            path.display()
        )));
    }

    // 2. Next to the running executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let binary = exe_dir.join(name);
            if binary.is_file() {
                return Ok(binary);
            }
        }
    }

    // 3. Fall back to PATH
    if let Ok(path) = which::which(name) {
        return Ok(path);
    }

    Err(PipelineError::Input(format!(
        "{name} binary not found. Install it, put it in PATH, or set {}.",
        tool.env_override()
    )))
}
