//! Naming of intermediate files inside the working directory.

use std::fmt;
use std::path::{Path, PathBuf};

/// Kinds of intermediate files produced by the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// All-vs-all read overlaps (PAF)
    Overlaps,
    /// Draft assembly from the layout tool (FASTA)
    Layout,
    /// Reads mapped onto an assembly (PAF)
    Mappings,
    /// Polished assembly (FASTA)
    Consensus,
}

impl ArtifactKind {
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Overlaps => "overlaps",
            ArtifactKind::Layout => "layout",
            ArtifactKind::Mappings => "mappings",
            ArtifactKind::Consensus => "consensus",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Overlaps | ArtifactKind::Mappings => "paf",
            ArtifactKind::Layout | ArtifactKind::Consensus => "fasta",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path of the artifact `kind` for `iteration` inside `work_dir`.
///
/// The file name is `<kind>_<iteration>.<ext>`; kind names are distinct, so
/// distinct `(kind, iteration)` pairs never share a path.
pub fn artifact_path(work_dir: &Path, kind: ArtifactKind, iteration: usize) -> PathBuf {
    work_dir.join(format!("{}_{}.{}", kind.name(), iteration, kind.extension()))
}
