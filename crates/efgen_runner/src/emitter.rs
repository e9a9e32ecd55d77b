//! Chisel driver emission.
//!
//! Writes every pending [`ModuleDescriptor`] into one `main.scala` and runs
//! the build tool once, so toolchain startup is paid per batch rather than
//! per module.

use std::fs;
use std::path::{Path, PathBuf};

use efgen_codegen::{render_driver, ModuleDescriptor};

use crate::command::{execute, CommandRunner, Toolchain};
use crate::error::RunError;

/// Location of the generated driver, relative to the hardware source root.
pub const DRIVER_PATH: &str = "src/main/scala/main.scala";

/// Build target that elaborates the generated driver.
pub const DEFAULT_BUILD_TARGET: &str = "rtlbuild";

/// Writes the driver source and invokes the hardware compiler.
#[derive(Debug, Clone)]
pub struct CompilerDriverEmitter {
    source_dir: PathBuf,
    build_target: String,
    toolchain: Toolchain,
}

impl CompilerDriverEmitter {
    /// Creates an emitter for the hardware sources rooted at `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_target: DEFAULT_BUILD_TARGET.to_string(),
            toolchain: Toolchain::default(),
        }
    }

    /// Uses `toolchain` to launch the build tool.
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Uses `target` instead of [`DEFAULT_BUILD_TARGET`].
    pub fn with_build_target(mut self, target: impl Into<String>) -> Self {
        self.build_target = target.into();
        self
    }

    /// Path of the generated driver source.
    pub fn driver_path(&self) -> PathBuf {
        self.source_dir.join(DRIVER_PATH)
    }

    /// The hardware source root.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Writes the driver for `descriptors` and runs the build tool.
    ///
    /// Returns the driver path on success. A non-zero build status is a
    /// [`RunError::CompilerInvocation`]; it is never retried.
    pub fn emit<R: CommandRunner + ?Sized>(
        &self,
        descriptors: &[ModuleDescriptor],
        runner: &mut R,
    ) -> Result<PathBuf, RunError> {
        let path = self.driver_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(RunError::io_at(parent))?;
        }
        fs::write(&path, render_driver(descriptors)).map_err(RunError::io_at(&path))?;
        log::info!(
            "Wrote {} elaboration target(s) to {}",
            descriptors.len(),
            path.display()
        );

        let invocation = self
            .toolchain
            .compiler_invocation(&self.source_dir, &self.build_target);
        match execute(runner, &invocation)? {
            Some(0) => Ok(path),
            code => Err(RunError::CompilerInvocation {
                command: invocation.to_string(),
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Invocation;
    use efgen_config::ParameterSet;
    use std::io;
    use tempfile::TempDir;

    struct FixedExit {
        code: Option<i32>,
        seen: Vec<Invocation>,
    }

    impl CommandRunner for FixedExit {
        fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
            self.seen.push(invocation.clone());
            Ok(self.code)
        }
    }

    fn descriptors(root: &Path) -> Vec<ModuleDescriptor> {
        let mut p = ParameterSet::new();
        p.insert("width", 8i64);
        vec![
            ModuleDescriptor::new("pkg.Uart", root.join("a"), p),
            ModuleDescriptor::new("pkg.Clock", root.join("b"), ParameterSet::new()),
        ]
    }

    #[test]
    fn writes_driver_and_runs_build_once() {
        let tmp = TempDir::new().unwrap();
        let emitter = CompilerDriverEmitter::new(tmp.path());
        let mut runner = FixedExit {
            code: Some(0),
            seen: Vec::new(),
        };
        let path = emitter.emit(&descriptors(tmp.path()), &mut runner).unwrap();

        assert_eq!(path, tmp.path().join("src/main/scala/main.scala"));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("emitSystemVerilogFile").count(), 2);
        let uart = text.find("new pkg.Uart(width = 8)").unwrap();
        let clock = text.find("new pkg.Clock()").unwrap();
        assert!(uart < clock);

        assert_eq!(runner.seen.len(), 1);
        assert_eq!(runner.seen[0].to_string(), "mill rtlbuild.run");
        assert_eq!(runner.seen[0].cwd.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn non_zero_exit_is_compiler_error() {
        let tmp = TempDir::new().unwrap();
        let emitter = CompilerDriverEmitter::new(tmp.path()).with_build_target("gen");
        let mut runner = FixedExit {
            code: Some(3),
            seen: Vec::new(),
        };
        let err = emitter.emit(&[], &mut runner).unwrap_err();
        match err {
            RunError::CompilerInvocation { command, code } => {
                assert_eq!(command, "mill gen.run");
                assert_eq!(code, Some(3));
            }
            other => panic!("expected CompilerInvocation, got {other:?}"),
        }
        assert!(emitter.driver_path().is_file());
    }
}
