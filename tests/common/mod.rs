//! Fake minimap2/rala/racon executables for driving the pipeline in tests.
//!
//! Each script appends `<tool> <args>` to a shared log file, so tests can
//! check which invocations happened and in what order.

#![allow(dead_code)]

use ra_pipeline::{Tool, ToolPaths};
use std::collections::HashSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

pub struct FakeTools {
    pub dir: TempDir,
    pub log: PathBuf,
    pub paths: ToolPaths,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> FakeToolsBuilder {
        FakeToolsBuilder::default()
    }

    /// Logged invocations, one per line.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(&self.log) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct FakeToolsBuilder {
    failing: HashSet<Tool>,
    silent: HashSet<Tool>,
    partial_final_output: bool,
    clobber_work_dir: bool,
}

impl FakeToolsBuilder {
    /// The tool exits with status 1 after logging.
    pub fn fail(mut self, tool: Tool) -> Self {
        self.failing.insert(tool);
        self
    }

    /// The tool succeeds but writes nothing.
    pub fn silent(mut self, tool: Tool) -> Self {
        self.silent.insert(tool);
        self
    }

    /// The last racon call writes part of the output file, then exits 2.
    pub fn partial_final_output(mut self) -> Self {
        self.partial_final_output = true;
        self
    }

    /// The last racon call replaces the working directory with a regular
    /// file of the same name before succeeding.
    pub fn clobber_work_dir(mut self) -> Self {
        self.clobber_work_dir = true;
        self
    }

    pub fn build(self) -> FakeTools {
        let dir = tempdir().unwrap();
        let log = dir.path().join("invocations.log");

        let paths = ToolPaths::new(
            self.write(dir.path(), &log, Tool::Aligner),
            self.write(dir.path(), &log, Tool::Layout),
            self.write(dir.path(), &log, Tool::Consensus),
        );

        FakeTools { dir, log, paths }
    }

    fn write(&self, dir: &Path, log: &Path, tool: Tool) -> PathBuf {
        let name = tool.binary_name();
        let mut script = format!("#!/bin/sh\necho \"{name} $*\" >> '{}'\n", log.display());

        if self.failing.contains(&tool) {
            script.push_str("echo \"fake failure\" >&2\nexit 1\n");
        } else if self.silent.contains(&tool) {
            script.push_str("exit 0\n");
        } else {
            match tool {
                Tool::Aligner => script.push_str(
                    "printf 'r1\\t1000\\t0\\t1000\\t+\\tr2\\t1000\\t0\\t1000\\t1000\\t1000\\t255\\n'\n",
                ),
                Tool::Layout => script.push_str("printf '>ctg1 draft\\nACGTACGTACGT\\n'\n"),
                Tool::Consensus => script.push_str(&self.consensus_body()),
            }
        }

        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

impl FakeToolsBuilder {
    /// Positional arguments are p1..p5: thread count, reads, mappings,
    /// reference and, on the last invocation only, the output file.
    fn consensus_body(&self) -> String {
        let mut body = String::from(concat!(
            "n=0\n",
            "for a in \"$@\"; do\n",
            "  case \"$a\" in\n",
            "    -*) ;;\n",
            "    *) n=$((n+1)); eval \"p$n=\\\"\\$a\\\"\" ;;\n",
            "  esac\n",
            "done\n",
            "if [ \"$n\" -eq 5 ]; then\n",
        ));
        if self.clobber_work_dir {
            body.push_str(concat!(
                "  w=$(dirname \"$p3\")\n",
                "  rm -rf \"$w\"\n",
                "  echo stale > \"$w\"\n",
            ));
        }
        if self.partial_final_output {
            body.push_str(concat!(
                "  printf '>ctg1 partial\\nACG' > \"$p5\"\n",
                "  exit 2\n",
            ));
        }
        body.push_str(concat!(
            "  printf '>ctg1 polished\\nACGTACGTACGT\\n' > \"$p5\"\n",
            "else\n",
            "  printf '>ctg1 consensus\\nACGTACGTACGT\\n'\n",
            "fi\n",
        ));
        body
    }
}

/// Input files and directories for one run.
pub struct RunFiles {
    pub dir: TempDir,
    pub reads: PathBuf,
    pub short_reads: PathBuf,
    pub output: PathBuf,
    pub work_root: PathBuf,
}

impl RunFiles {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let reads = dir.path().join("reads.fastq");
        let short_reads = dir.path().join("short.fastq");
        fs::write(&reads, "@read1\nACGTACGTACGT\n+\n############\n").unwrap();
        fs::write(&short_reads, "@s1\nACGTAC\n+\n######\n").unwrap();
        let output = dir.path().join("assembly.fasta");
        let work_root = dir.path().join("work");
        fs::create_dir(&work_root).unwrap();

        RunFiles {
            dir,
            reads,
            short_reads,
            output,
            work_root,
        }
    }

    /// Entries left under the working-directory root.
    pub fn leftover_work_dirs(&self) -> usize {
        fs::read_dir(&self.work_root).unwrap().count()
    }
}
