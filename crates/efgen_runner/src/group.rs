//! One orchestrated test batch.
//!
//! A [`TestRunGroup`] moves through a fixed sequence of [`RunState`]s:
//! the output root is wiped, every selected test is expanded and its harness
//! written, all descriptors are elaborated in a single compiler pass, and the
//! test runner executes the whole output root once. Any error ends the run in
//! [`RunState::Failed`].
//!
//! Concurrent runs against the same testbench directory are not supported;
//! `run` takes `&mut self`, and callers sharing a directory across processes
//! must serialize themselves.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use efgen_codegen::{CocotbHarness, ModuleDescriptor};
use efgen_config::{ConfigError, Simulator};

use crate::command::{execute, CommandRunner, Toolchain};
use crate::emitter::{CompilerDriverEmitter, DEFAULT_BUILD_TARGET};
use crate::error::RunError;
use crate::expander::TestMatrixExpander;
use crate::filter::TestSelectionFilter;
use crate::spec::TestCaseSpec;

/// Progress of a [`TestRunGroup::run`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has happened yet.
    Idle,
    /// The output root was deleted and recreated.
    Cleaned,
    /// Harnesses were generated for every selected test.
    Expanded,
    /// The compiler elaborated every descriptor.
    Emitted,
    /// The test runner finished.
    Executed,
    /// Every selected test passed.
    Passed,
    /// A stage failed.
    Failed,
}

/// The filesystem-free result of filtering and expanding a group's tests.
#[derive(Debug, Clone)]
pub struct Plan {
    /// One harness per (selected test, parameter set), in test-then-parameter order.
    pub harnesses: Vec<CocotbHarness>,
    /// Modules rejected by the selection filter.
    pub skipped: Vec<String>,
}

impl Plan {
    /// Compiler descriptors in harness order.
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.harnesses.iter().map(|h| h.descriptor.clone()).collect()
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The generated driver, or `None` when no test was selected.
    pub driver_path: Option<PathBuf>,
    /// Every descriptor elaborated, in driver order.
    pub descriptors: Vec<ModuleDescriptor>,
    /// Every generated harness file.
    pub test_files: Vec<PathBuf>,
    /// Modules rejected by the selection filter.
    pub skipped: Vec<String>,
}

/// A batch of tests sharing one simulator, testbench directory, and source root.
#[derive(Debug)]
pub struct TestRunGroup {
    simulator: Simulator,
    tb_dir: PathBuf,
    source_dir: PathBuf,
    out_dir: PathBuf,
    tests: Vec<TestCaseSpec>,
    filter: TestSelectionFilter,
    toolchain: Toolchain,
    build_target: String,
    state: RunState,
}

impl TestRunGroup {
    /// Creates an empty group.
    ///
    /// Both directories must already exist. Generated files go to
    /// `<tb_dir>/out`. `simulator` defaults to VCS.
    pub fn new(
        simulator: Option<Simulator>,
        tb_dir: &Path,
        source_dir: &Path,
    ) -> Result<Self, RunError> {
        let tb_dir = require_dir(tb_dir)?;
        let source_dir = require_dir(source_dir)?;
        let out_dir = tb_dir.join("out");
        Ok(Self {
            simulator: simulator.unwrap_or_default(),
            tb_dir,
            source_dir,
            out_dir,
            tests: Vec::new(),
            filter: TestSelectionFilter::allow_all(),
            toolchain: Toolchain::default(),
            build_target: DEFAULT_BUILD_TARGET.to_string(),
            state: RunState::Idle,
        })
    }

    /// Uses `toolchain` for the compiler and test runner.
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Uses `target` as the compiler build target.
    pub fn with_build_target(mut self, target: impl Into<String>) -> Self {
        self.build_target = target.into();
        self
    }

    /// Replaces the selection filter.
    pub fn set_filter(&mut self, filter: TestSelectionFilter) {
        self.filter = filter;
    }

    /// Adds a test after checking its invariants.
    pub fn add_test(&mut self, spec: TestCaseSpec) -> Result<(), RunError> {
        spec.validate()?;
        self.tests.push(spec);
        Ok(())
    }

    /// The selected simulator.
    pub fn simulator(&self) -> Simulator {
        self.simulator
    }

    /// Absolute testbench directory.
    pub fn tb_dir(&self) -> &Path {
        &self.tb_dir
    }

    /// Absolute hardware source root.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Output root, wiped at the start of every run.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Registered tests, in insertion order.
    pub fn tests(&self) -> &[TestCaseSpec] {
        &self.tests
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Filters and expands every test without touching the filesystem.
    ///
    /// Fails if two harnesses would share an output directory.
    pub fn plan(&self) -> Result<Plan, RunError> {
        let expander = TestMatrixExpander::new(&self.out_dir, &self.tb_dir, self.simulator);
        let mut harnesses = Vec::new();
        let mut skipped = Vec::new();
        let mut owners: HashMap<PathBuf, &str> = HashMap::new();

        for spec in &self.tests {
            if !self.filter.allows(spec.module()) {
                log::debug!("Filtered out {}", spec.module());
                skipped.push(spec.module().to_string());
                continue;
            }
            for harness in expander.expand(spec) {
                let dir = harness.descriptor.target_dir().to_path_buf();
                if let Some(previous) = owners.insert(dir.clone(), spec.module()) {
                    return Err(ConfigError::ValidationError(format!(
                        "tests for {previous} and {} both generate into {}",
                        spec.module(),
                        dir.display()
                    ))
                    .into());
                }
                harnesses.push(harness);
            }
        }

        Ok(Plan { harnesses, skipped })
    }

    /// Runs the batch: clean, expand, emit, execute.
    ///
    /// A test runner failure is returned as [`RunError::TestExecution`] with
    /// the runner's exit code; partial results are whatever the runner itself
    /// reported.
    pub fn run<R: CommandRunner + ?Sized>(
        &mut self,
        runner: &mut R,
    ) -> Result<RunReport, RunError> {
        self.state = RunState::Idle;
        let result = self.run_stages(runner);
        if result.is_err() {
            self.state = RunState::Failed;
        }
        result
    }

    fn run_stages<R: CommandRunner + ?Sized>(
        &mut self,
        runner: &mut R,
    ) -> Result<RunReport, RunError> {
        require_dir(&self.tb_dir)?;
        require_dir(&self.source_dir)?;

        // Step 1: Clean
        self.clean()?;
        self.state = RunState::Cleaned;

        // Step 2: Expand
        let plan = self.plan()?;
        let mut test_files = Vec::with_capacity(plan.harnesses.len());
        for harness in &plan.harnesses {
            let dir = harness.descriptor.target_dir();
            fs::create_dir_all(dir).map_err(RunError::io_at(dir))?;
            let path = harness.path();
            fs::write(&path, harness.render()).map_err(RunError::io_at(&path))?;
            log::debug!("Generated {}", path.display());
            test_files.push(path);
        }
        let mut report = RunReport {
            driver_path: None,
            descriptors: plan.descriptors(),
            test_files,
            skipped: plan.skipped,
        };
        self.state = RunState::Expanded;

        if report.descriptors.is_empty() {
            log::warn!("no tests selected; skipping compiler and test runner");
            self.state = RunState::Passed;
            return Ok(report);
        }

        // Step 3: Emit
        let emitter = CompilerDriverEmitter::new(&self.source_dir)
            .with_toolchain(self.toolchain.clone())
            .with_build_target(&self.build_target);
        report.driver_path = Some(emitter.emit(&report.descriptors, runner)?);
        self.state = RunState::Emitted;

        // Step 4: Execute
        log::info!(
            "Running {} generated test(s) with up to {} worker(s)",
            report.test_files.len(),
            self.toolchain.jobs
        );
        let invocation = self.toolchain.test_invocation(&self.out_dir);
        let code = execute(runner, &invocation)?;
        self.state = RunState::Executed;

        if code == Some(0) {
            self.state = RunState::Passed;
            Ok(report)
        } else {
            Err(RunError::TestExecution {
                command: invocation.to_string(),
                code,
            })
        }
    }

    /// Deletes and recreates the output root.
    fn clean(&self) -> Result<(), RunError> {
        let out = &self.out_dir;
        if out.exists() {
            if !out.is_dir() {
                return Err(RunError::path(out, "not a directory"));
            }
            fs::remove_dir_all(out).map_err(RunError::io_at(out))?;
        }
        fs::create_dir_all(out).map_err(RunError::io_at(out))
    }
}

/// Checks that `dir` exists and is a directory, returning its absolute path.
pub(crate) fn require_dir(dir: &Path) -> Result<PathBuf, RunError> {
    if !dir.exists() {
        return Err(RunError::path(dir, "not found"));
    }
    if !dir.is_dir() {
        return Err(RunError::path(dir, "not a directory"));
    }
    dir.canonicalize().map_err(RunError::io_at(dir))
}
