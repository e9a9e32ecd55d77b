//! Generated cocotb harness files.
//!
//! Each expanded parameter set gets one Python file that pytest discovers.
//! The file holds exactly one pytest entry point, which launches the
//! simulator, and one cocotb coroutine, which hands the behavioral test a
//! `ParamAccessor` object instead of module-level globals.

use std::path::{Path, PathBuf};

use efgen_config::Simulator;

use crate::chisel::{sanitize, ModuleDescriptor};
use crate::literal::{LiteralSyntax, Python};
use crate::writer::CodeWriter;

/// Name of the coroutine every behavioral test module must export.
pub const BEHAVIORAL_ENTRY: &str = "cocotb_chisel_test";

/// Everything needed to render one generated test file.
#[derive(Debug, Clone)]
pub struct CocotbHarness {
    /// The compiler invocation whose output this harness simulates.
    pub descriptor: ModuleDescriptor,
    /// Index of the parameter set within its test.
    pub index: usize,
    /// Simulator selected for the run.
    pub simulator: Simulator,
    /// Simulation timescale, `<unit>/<precision>`.
    pub timescale: String,
    /// Whether waveforms are recorded.
    pub waves: bool,
    /// Python module in `tb_dir` that exports [`BEHAVIORAL_ENTRY`].
    pub testbench: String,
    /// Directory holding the behavioral test modules.
    pub tb_dir: PathBuf,
}

impl CocotbHarness {
    /// Python module name of the generated file.
    pub fn stem(&self) -> String {
        format!(
            "test_{}_param{}",
            sanitize(self.descriptor.module()),
            self.index
        )
    }

    /// Path of the generated file, next to the compiler output.
    pub fn path(&self) -> PathBuf {
        self.descriptor
            .target_dir()
            .join(format!("{}.py", self.stem()))
    }

    /// Default behavioral module name for a qualified module name.
    pub fn default_testbench(module: &str) -> String {
        format!("test_{}", sanitize(module))
    }

    /// Renders the generated test file.
    pub fn render(&self) -> String {
        let stem = self.stem();
        let toplevel = self.descriptor.toplevel();
        let mut w = CodeWriter::new("    ");

        w.line(format!(
            "# Generated by efgen from {} (parameter set {}). Do not edit.",
            self.descriptor.module(),
            self.index
        ));
        for import in ["os", "pathlib", "sys"] {
            w.line(format!("import {import}"));
        }
        w.blank();
        for import in ["cocotb", "cocotb_test.simulator", "pytest"] {
            w.line(format!("import {import}"));
        }
        w.blank();
        w.line("HERE = pathlib.Path(__file__).resolve().parent");
        w.line(format!(
            "TB_DIR = pathlib.Path({})",
            path_literal(&self.tb_dir)
        ));
        w.line("sys.path.insert(0, str(TB_DIR))");
        w.blank();
        w.line(format!(
            "from {} import {BEHAVIORAL_ENTRY}  # noqa: E402",
            self.testbench
        ));
        w.blank();
        self.write_params(&mut w);
        w.blank();
        w.blank();
        w.block("class ParamAccessor:", |w| {
            w.line(r#""""Attribute-style view of one parameter set; unknown names are None.""""#);
            w.blank();
            w.block("def __init__(self, params):", |w| {
                w.line("self._params = dict(params)");
            });
            w.blank();
            w.block("def __getattr__(self, name):", |w| {
                w.line("return self.__dict__.get(\"_params\", {}).get(name)");
            });
        });
        w.blank();
        w.blank();
        w.line("@pytest.mark.trylast");
        w.block(format!("def {stem}():"), |w| {
            w.line(format!(
                "os.environ[\"SIM\"] = {}",
                Python.string(self.simulator.name())
            ));
            self.write_simulator_run(w, &stem, toplevel);
        });
        w.blank();
        w.blank();
        w.line("@cocotb.test()");
        w.block(format!("async def cocotb_{stem}(dut):"), |w| {
            w.line(format!(
                "await {BEHAVIORAL_ENTRY}(dut, ParamAccessor(PARAMS))"
            ));
        });
        w.finish()
    }

    fn write_params(&self, w: &mut CodeWriter) {
        let params = self.descriptor.params();
        if params.is_empty() {
            w.line("PARAMS = {}");
            return;
        }
        w.braced("PARAMS = {", "}", |w| {
            for (name, value) in params.iter() {
                w.line(format!("{}: {},", Python.string(name), Python.value(value)));
            }
        });
    }

    fn write_simulator_run(&self, w: &mut CodeWriter, stem: &str, toplevel: &str) {
        let extra_args: Vec<String> = self
            .simulator
            .extra_args(self.waves)
            .iter()
            .map(|a| Python.string(a))
            .collect();
        w.braced("cocotb_test.simulator.run(", ")", |w| {
            w.line(format!(
                "verilog_sources=[str(HERE / {})],",
                Python.string(&format!("{toplevel}.sv"))
            ));
            w.line(format!("toplevel={},", Python.string(toplevel)));
            w.line("toplevel_lang=\"verilog\",");
            w.line(format!("module={},", Python.string(stem)));
            w.line("python_search=[str(HERE), str(TB_DIR)],");
            w.line("sim_build=str(HERE / \"sim_build\"),");
            w.line(format!("timescale={},", Python.string(&self.timescale)));
            w.line(format!("waves={},", Python.boolean(self.waves)));
            w.line(format!("extra_args=[{}],", extra_args.join(", ")));
            w.line("gui=False,");
        });
    }
}

fn path_literal(path: &Path) -> String {
    Python.string(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use efgen_config::ParameterSet;

    fn harness(params: ParameterSet, simulator: Simulator, waves: bool) -> CocotbHarness {
        CocotbHarness {
            descriptor: ModuleDescriptor::new("pkg.Uart", "/tb/out/pkg_Uart/test1", params),
            index: 1,
            simulator,
            timescale: "1ns/1ps".to_string(),
            waves,
            testbench: CocotbHarness::default_testbench("pkg.Uart"),
            tb_dir: PathBuf::from("/tb"),
        }
    }

    fn width8() -> ParameterSet {
        [("width", 8i64)].into_iter().collect()
    }

    #[test]
    fn names_and_paths() {
        let h = harness(width8(), Simulator::Vcs, false);
        assert_eq!(h.stem(), "test_pkg_Uart_param1");
        assert_eq!(
            h.path(),
            PathBuf::from("/tb/out/pkg_Uart/test1/test_pkg_Uart_param1.py")
        );
        assert_eq!(h.testbench, "test_pkg_Uart");
    }

    #[test]
    fn exactly_one_pytest_entry_point() {
        let text = harness(width8(), Simulator::Vcs, false).render();
        let entries = text
            .lines()
            .filter(|l| l.starts_with("def test_") || l.starts_with("async def test_"))
            .count();
        assert_eq!(entries, 1);
        assert!(text.contains("def test_pkg_Uart_param1():"));
        assert!(text.contains("async def cocotb_test_pkg_Uart_param1(dut):"));
    }

    #[test]
    fn imports_behavioral_entry_from_testbench() {
        let text = harness(width8(), Simulator::Vcs, false).render();
        assert!(text.contains("from test_pkg_Uart import cocotb_chisel_test"));
        assert!(text.contains("TB_DIR = pathlib.Path(\"/tb\")"));
        assert!(text.contains("await cocotb_chisel_test(dut, ParamAccessor(PARAMS))"));
    }

    #[test]
    fn params_render_as_python_dict() {
        let text = harness(width8(), Simulator::Vcs, false).render();
        assert!(text.contains("PARAMS = {\n    \"width\": 8,\n}\n"));
    }

    #[test]
    fn empty_params_render_as_empty_dict() {
        let text = harness(ParameterSet::new(), Simulator::Vcs, false).render();
        assert!(text.contains("PARAMS = {}\n"));
    }

    #[test]
    fn accessor_falls_back_to_none() {
        let text = harness(width8(), Simulator::Vcs, false).render();
        assert!(text.contains(
            "    def __getattr__(self, name):\n        \
             return self.__dict__.get(\"_params\", {}).get(name)\n"
        ));
    }

    #[test]
    fn simulator_settings_are_forwarded() {
        let text = harness(width8(), Simulator::Verilator, true).render();
        assert!(text.contains("    os.environ[\"SIM\"] = \"verilator\"\n"));
        assert!(text.contains("        toplevel=\"Uart\",\n"));
        assert!(text.contains("        module=\"test_pkg_Uart_param1\",\n"));
        assert!(text.contains("        timescale=\"1ns/1ps\",\n"));
        assert!(text.contains("        waves=True,\n"));
        assert!(text.contains("        extra_args=[\"--trace\", \"--trace-structs\"],\n"));
        assert!(text.contains("        verilog_sources=[str(HERE / \"Uart.sv\")],\n"));
    }

    #[test]
    fn no_extra_args_without_waves() {
        let text = harness(width8(), Simulator::Icarus, false).render();
        assert!(text.contains("        waves=False,\n"));
        assert!(text.contains("        extra_args=[],\n"));
    }
}
