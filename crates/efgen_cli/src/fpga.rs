//! Implementation of the `efgen fpga` and `efgen test` commands.

use efgen_runner::{DryRunner, FpgaOptions, FpgaProject, RunError, SystemRunner, Toolchain};

use crate::FpgaArgs;

/// Runs the selected stages of an FPGA project.
pub fn run(args: &FpgaArgs) -> Result<i32, RunError> {
    let options = FpgaOptions {
        test: args.test,
        build: args.build,
    };
    if !options.test && !options.build {
        log::warn!("neither --test nor --build given; nothing to do");
        return Ok(0);
    }

    let mut toolchain = Toolchain::default();
    if let Some(jobs) = args.jobs {
        toolchain.jobs = jobs.max(1);
    }
    let project = FpgaProject::load(&args.dir)?.with_toolchain(toolchain);

    if args.dry_run {
        let mut runner = DryRunner::default();
        project.run(options, &mut runner)?;
        for invocation in runner.invocations() {
            println!("{invocation}");
        }
    } else {
        project.run(options, &mut SystemRunner)?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_project(dir: &Path) {
        fs::create_dir_all(dir.join("tb")).unwrap();
        fs::create_dir_all(dir.join("mk")).unwrap();
        fs::write(
            dir.join("build.toml"),
            "[build]\nboard = \"au200\"\nvariant = \"base\"\nfpga = \"xcu200\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("test.toml"),
            "[[tests]]\nmodule = \"efnet.utils.UartTx\"\nparams = [{ width = 8 }]\n",
        )
        .unwrap();
    }

    fn args(dir: &Path, test: bool, build: bool) -> FpgaArgs {
        FpgaArgs {
            dir: dir.to_path_buf(),
            test,
            build,
            dry_run: true,
            jobs: Some(2),
        }
    }

    #[test]
    fn nothing_selected_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(run(&args(tmp.path(), false, false)).unwrap(), 0);
    }

    #[test]
    fn dry_run_generates_files() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        assert_eq!(run(&args(tmp.path(), true, true)).unwrap(), 0);
        assert!(tmp.path().join("src/main/scala/main.scala").is_file());
        assert!(tmp
            .path()
            .join("tb/out/efnet_utils_UartTx/test0/test_efnet_utils_UartTx_param0.py")
            .is_file());
    }

    #[test]
    fn missing_project_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = run(&args(&tmp.path().join("nope"), true, false)).unwrap_err();
        assert!(matches!(err, RunError::Path { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
