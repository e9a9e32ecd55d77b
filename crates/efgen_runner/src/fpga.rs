//! FPGA project flow: test the board's modules, then build its bitstream.
//!
//! An FPGA project directory holds `build.toml`, an optional `test.toml`,
//! behavioral tests under `tb/`, and board makefiles under `mk/`.

use std::fs;
use std::path::{Path, PathBuf};

use efgen_codegen::ModuleDescriptor;
use efgen_config::{load_build_file, load_test_suite, BuildFile};

use crate::command::{execute, CommandRunner, Toolchain};
use crate::emitter::{CompilerDriverEmitter, DEFAULT_BUILD_TARGET};
use crate::error::RunError;
use crate::filter::TestSelectionFilter;
use crate::group::{require_dir, RunReport, TestRunGroup};
use crate::spec::TestCaseSpec;

/// Which stages of [`FpgaProject::run`] to perform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FpgaOptions {
    /// Generate and run the cocotb test matrix.
    pub test: bool,
    /// Elaborate the top module and build the bitstream.
    pub build: bool,
}

/// A loaded FPGA project directory.
#[derive(Debug)]
pub struct FpgaProject {
    dir: PathBuf,
    config: BuildFile,
    toolchain: Toolchain,
}

impl FpgaProject {
    /// Loads `<dir>/build.toml`.
    pub fn load(dir: &Path) -> Result<Self, RunError> {
        let dir = require_dir(dir)?;
        let config = load_build_file(&dir)?;
        Ok(Self {
            dir,
            config,
            toolchain: Toolchain::default(),
        })
    }

    /// Uses `toolchain` for every external command.
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// The parsed `build.toml`.
    pub fn config(&self) -> &BuildFile {
        &self.config
    }

    /// The project directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Builds the test group described by `build.toml` and `test.toml`.
    ///
    /// A missing `test.toml` yields an empty group.
    pub fn test_group(&self) -> Result<TestRunGroup, RunError> {
        let mut group = TestRunGroup::new(
            Some(self.config.test.simulator),
            &self.dir.join("tb"),
            &self.dir,
        )?
        .with_toolchain(self.toolchain.clone());
        group.set_filter(TestSelectionFilter::from_config(&self.config.test)?);

        let test_toml = self.dir.join("test.toml");
        if test_toml.is_file() {
            for entry in load_test_suite(&test_toml)?.tests {
                group.add_test(TestCaseSpec::from(entry))?;
            }
        } else {
            log::warn!("{} not found; no tests to run", test_toml.display());
        }
        Ok(group)
    }

    /// Generates and runs the test matrix.
    pub fn run_tests<R: CommandRunner + ?Sized>(
        &self,
        runner: &mut R,
    ) -> Result<RunReport, RunError> {
        let mut group = self.test_group()?;
        group.run(runner)
    }

    /// The descriptor for the board's top module, emitted into `<dir>/rtl`.
    pub fn top_descriptor(&self) -> ModuleDescriptor {
        let build = &self.config.build;
        ModuleDescriptor::new(
            build.top_module(),
            self.dir.join("rtl"),
            build.params.clone(),
        )
    }

    /// Elaborates the top module and runs the board makefile.
    pub fn build<R: CommandRunner + ?Sized>(&self, runner: &mut R) -> Result<(), RunError> {
        let descriptor = self.top_descriptor();
        let rtl_dir = descriptor.target_dir();
        fs::create_dir_all(rtl_dir).map_err(RunError::io_at(rtl_dir))?;

        CompilerDriverEmitter::new(&self.dir)
            .with_toolchain(self.toolchain.clone())
            .with_build_target(DEFAULT_BUILD_TARGET)
            .emit(std::slice::from_ref(&descriptor), runner)?;

        let mk_dir = require_dir(&self.dir.join("mk"))?;
        let invocation = self
            .toolchain
            .bitstream_invocation(&mk_dir, &self.config.build.makefile());
        match execute(runner, &invocation)? {
            Some(0) => Ok(()),
            code => Err(RunError::BitstreamBuild {
                command: invocation.to_string(),
                code,
            }),
        }
    }

    /// Runs the selected stages, tests first. A test failure stops the build.
    pub fn run<R: CommandRunner + ?Sized>(
        &self,
        options: FpgaOptions,
        runner: &mut R,
    ) -> Result<(), RunError> {
        if options.test {
            let report = self.run_tests(runner)?;
            log::info!(
                "{} test file(s) passed, {} module(s) filtered out",
                report.test_files.len(),
                report.skipped.len()
            );
        }
        if options.build {
            self.build(runner)?;
            log::info!("Built {}", self.config.build.makefile());
        }
        Ok(())
    }
}
