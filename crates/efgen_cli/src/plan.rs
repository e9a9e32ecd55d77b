//! Implementation of the `efgen plan` command.

use std::path::{Path, PathBuf};

use efgen_config::ParameterSet;
use efgen_runner::{FpgaProject, Plan, RunError};
use serde::Serialize;

use crate::{PlanArgs, ReportFormat};

/// One expanded test case as reported by `efgen plan`.
#[derive(Debug, Serialize)]
struct PlannedTest<'a> {
    module: &'a str,
    index: usize,
    params: &'a ParameterSet,
    target_dir: &'a Path,
    test_file: PathBuf,
}

/// The full plan as reported by `efgen plan`.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    simulator: &'a str,
    tests: Vec<PlannedTest<'a>>,
    skipped: &'a [String],
}

impl<'a> PlanReport<'a> {
    fn new(simulator: &'a str, plan: &'a Plan) -> Self {
        let tests = plan
            .harnesses
            .iter()
            .map(|h| PlannedTest {
                module: h.descriptor.module(),
                index: h.index,
                params: h.descriptor.params(),
                target_dir: h.descriptor.target_dir(),
                test_file: h.path(),
            })
            .collect();
        Self {
            simulator,
            tests,
            skipped: &plan.skipped,
        }
    }
}

/// Prints the expanded test matrix of a project without touching the disk.
pub fn run(args: &PlanArgs) -> Result<i32, RunError> {
    let project = FpgaProject::load(&args.dir)?;
    let plan = project.test_group()?.plan()?;
    let report = PlanReport::new(project.config().test.simulator.name(), &plan);

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
    Ok(0)
}

fn render_text(report: &PlanReport<'_>) -> String {
    let mut out = String::new();
    for test in &report.tests {
        let params: Vec<String> = test
            .params
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect();
        out.push_str(&format!(
            "{:>12} {} [{}] {}\n",
            "Planned",
            test.module,
            test.index,
            params.join(", ")
        ));
        out.push_str(&format!("{:>12} {}\n", "->", test.test_file.display()));
    }
    for module in report.skipped {
        out.push_str(&format!("{:>12} {module}\n", "Skipped"));
    }
    out.push_str(&format!(
        "{:>12} {} test(s) on {}, {} module(s) filtered out\n",
        "Total",
        report.tests.len(),
        report.simulator,
        report.skipped.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("tb")).unwrap();
        fs::write(
            tmp.path().join("build.toml"),
            r#"
[build]
board = "au200"
variant = "base"
fpga = "xcu200"

[test]
simulator = "verilator"
blacklist = "efnet.utils.Clock"
"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("test.toml"),
            r#"
[[tests]]
module = "efnet.utils.UartTx"
params = [{ width = 8 }, { width = 16, parity = true }]

[[tests]]
module = "efnet.utils.ClockDivider"
params = [{ div = 4 }]
"#,
        )
        .unwrap();
        tmp
    }

    fn plan_for(tmp: &TempDir) -> Plan {
        FpgaProject::load(tmp.path())
            .unwrap()
            .test_group()
            .unwrap()
            .plan()
            .unwrap()
    }

    #[test]
    fn text_lists_tests_and_skips() {
        let tmp = project();
        let plan = plan_for(&tmp);
        let text = render_text(&PlanReport::new("verilator", &plan));
        assert!(text.contains("Planned efnet.utils.UartTx [0] width = 8\n"));
        assert!(text.contains("Planned efnet.utils.UartTx [1] parity = true, width = 16\n"));
        assert!(text.contains("test_efnet_utils_UartTx_param1.py"));
        assert!(text.contains("Skipped efnet.utils.ClockDivider\n"));
        assert!(text.ends_with("Total 2 test(s) on verilator, 1 module(s) filtered out\n"));
    }

    #[test]
    fn json_report_fields() {
        let tmp = project();
        let plan = plan_for(&tmp);
        let json = serde_json::to_value(PlanReport::new("verilator", &plan)).unwrap();
        assert_eq!(json["simulator"], "verilator");
        assert_eq!(json["tests"].as_array().unwrap().len(), 2);
        assert_eq!(json["tests"][1]["module"], "efnet.utils.UartTx");
        assert_eq!(json["tests"][1]["index"], 1);
        assert_eq!(json["tests"][1]["params"]["width"], 16);
        assert_eq!(json["tests"][1]["params"]["parity"], true);
        assert_eq!(json["skipped"][0], "efnet.utils.ClockDivider");
    }

    #[test]
    fn plan_does_not_write_files() {
        let tmp = project();
        let args = PlanArgs {
            dir: tmp.path().to_path_buf(),
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args).unwrap(), 0);
        assert!(!tmp.path().join("tb/out").exists());
        assert!(!tmp.path().join("src").exists());
    }
}
