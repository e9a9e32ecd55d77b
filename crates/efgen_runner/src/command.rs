//! External process invocation.
//!
//! All external tools (the hardware compiler's build tool, the test runner,
//! and the bitstream makefile) are launched through the [`CommandRunner`]
//! trait so orchestration can be exercised without the tools installed.
//! No timeout is applied: a hung tool blocks the run until it exits.

use std::fmt;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::RunError;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory, or the current directory when `None`.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands to completion.
pub trait CommandRunner {
    /// Runs `invocation` and returns its exit code, or `None` if the process
    /// was terminated by a signal.
    fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// Runs commands as real child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }
        match &invocation.cwd {
            Some(dir) => log::info!("Running: {invocation} (in {})", dir.display()),
            None => log::info!("Running: {invocation}"),
        }
        let status = cmd.status()?;
        Ok(status.code())
    }
}

/// Logs commands instead of running them and reports success.
#[derive(Debug, Default)]
pub struct DryRunner {
    invocations: Vec<Invocation>,
}

impl DryRunner {
    /// Commands that would have been run, in order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }
}

impl CommandRunner for DryRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
        log::info!("Would run: {invocation}");
        self.invocations.push(invocation.clone());
        Ok(Some(0))
    }
}

/// Runs `invocation`, turning a launch failure into [`RunError::Spawn`].
pub(crate) fn execute<R: CommandRunner + ?Sized>(
    runner: &mut R,
    invocation: &Invocation,
) -> Result<Option<i32>, RunError> {
    runner.run(invocation).map_err(|source| RunError::Spawn {
        command: invocation.to_string(),
        source,
    })
}

/// Names of the external tools and how hard to drive them.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Build tool that compiles and runs the generated driver (`mill`).
    pub build_tool: String,
    /// Test runner executed over the generated harnesses (`pytest`).
    pub test_runner: String,
    /// Bitstream build tool (`make`).
    pub make: String,
    /// Worker processes requested from the test runner.
    pub jobs: usize,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            build_tool: "mill".to_string(),
            test_runner: "pytest".to_string(),
            make: "make".to_string(),
            jobs: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl Toolchain {
    /// `mill <target>.run`, run from the hardware source root.
    pub fn compiler_invocation(&self, source_dir: &Path, target: &str) -> Invocation {
        Invocation::new(&self.build_tool)
            .arg(format!("{target}.run"))
            .current_dir(source_dir)
    }

    /// `pytest -n <jobs> <dir>`.
    pub fn test_invocation(&self, out_dir: &Path) -> Invocation {
        Invocation::new(&self.test_runner)
            .arg("-n")
            .arg(self.jobs.to_string())
            .arg(out_dir.to_string_lossy())
    }

    /// `make -f <makefile> all`, run from the makefile directory.
    pub fn bitstream_invocation(&self, mk_dir: &Path, makefile: &str) -> Invocation {
        Invocation::new(&self.make)
            .arg("-f")
            .arg(makefile)
            .arg("all")
            .current_dir(mk_dir)
    }
}
