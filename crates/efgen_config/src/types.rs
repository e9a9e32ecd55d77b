//! Configuration types deserialized from `build.toml` and `test.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::params::ParameterSet;

/// Timescale used when a test does not specify one.
pub const DEFAULT_TIMESCALE: &str = "1ns/1ps";

/// The top-level FPGA project configuration parsed from `build.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct BuildFile {
    /// Board, variant, and top module settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Test settings (simulator, selection patterns).
    #[serde(default)]
    pub test: TestConfig,
}

/// The `[build]` table: which board design to synthesize.
#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    /// Board name (e.g., "au200").
    #[serde(default)]
    pub board: String,
    /// Board variant (e.g., "base").
    #[serde(default)]
    pub variant: String,
    /// FPGA part family name.
    #[serde(default)]
    pub fpga: String,
    /// Qualified top module name. Derived from board/variant/fpga when absent.
    #[serde(default)]
    pub module: Option<String>,
    /// Parameters used to instantiate the top module.
    #[serde(default)]
    pub params: ParameterSet,
}

impl BuildConfig {
    /// Returns the qualified name of the top module to synthesize.
    pub fn top_module(&self) -> String {
        match &self.module {
            Some(m) => m.clone(),
            None => format!(
                "efnet.nic.{}.{}.{}.EfnetNic",
                self.board, self.variant, self.fpga
            ),
        }
    }

    /// Returns the makefile name used for the bitstream build.
    pub fn makefile(&self) -> String {
        format!("{}_{}_{}.mk", self.board, self.variant, self.fpga)
    }
}

/// The `[test]` table of `build.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct TestConfig {
    /// Simulator used by the generated harnesses.
    #[serde(default)]
    pub simulator: Simulator,
    /// Patterns selecting which modules are tested.
    #[serde(default, deserialize_with = "deserialize_pattern_list")]
    pub allowlist: Vec<String>,
    /// Patterns excluding modules from testing.
    #[serde(default, deserialize_with = "deserialize_pattern_list")]
    pub blacklist: Vec<String>,
}

/// Deserializes a pattern list that can be either a semicolon-delimited
/// string or a list of strings.
///
/// Accepts both `allowlist = "uart.*;clock.*"` and
/// `allowlist = ["uart.*", "clock.*"]`. Entries are trimmed and empty entries
/// dropped, so `allowlist = ""` means no patterns.
fn deserialize_pattern_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PatternList;

    impl<'de> Visitor<'de> for PatternList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a semicolon-delimited string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(split_patterns(v.split(';')))
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                entries.push(val);
            }
            Ok(split_patterns(entries.iter().map(String::as_str)))
        }
    }

    deserializer.deserialize_any(PatternList)
}

fn split_patterns<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<String> {
    entries
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Simulator driven by the generated cocotb harnesses.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Simulator {
    /// Synopsys VCS (default).
    #[default]
    Vcs,
    /// Verilator.
    Verilator,
    /// Icarus Verilog.
    Icarus,
}

impl Simulator {
    /// The name cocotb expects in the `SIM` environment variable.
    pub fn name(self) -> &'static str {
        match self {
            Simulator::Vcs => "vcs",
            Simulator::Verilator => "verilator",
            Simulator::Icarus => "icarus",
        }
    }

    /// Extra compile arguments passed to the simulator.
    pub fn extra_args(self, waves: bool) -> &'static [&'static str] {
        match self {
            Simulator::Verilator if waves => &["--trace", "--trace-structs"],
            _ => &[],
        }
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The test list parsed from `test.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct TestSuite {
    /// All declared tests, in file order.
    #[serde(default)]
    pub tests: Vec<TestEntry>,
}

/// One `[[tests]]` entry.
#[derive(Debug, Deserialize)]
pub struct TestEntry {
    /// Qualified module name (e.g., "efnet.utils.UartTx").
    #[serde(default)]
    pub module: String,
    /// One parameter set per module variant under test.
    #[serde(default)]
    pub params: Vec<ParameterSet>,
    /// Simulation timescale, `<unit>/<precision>`.
    #[serde(default = "default_timescale")]
    pub timescale: String,
    /// Whether the simulator records waveforms.
    #[serde(default)]
    pub waves: bool,
    /// Behavioral test module in the testbench directory.
    #[serde(default)]
    pub testbench: Option<String>,
    /// Skip this test entirely.
    #[serde(default)]
    pub disable: bool,
}

fn default_timescale() -> String {
    DEFAULT_TIMESCALE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulator_all_variants() {
        for (input, expected) in [
            ("vcs", Simulator::Vcs),
            ("verilator", Simulator::Verilator),
            ("icarus", Simulator::Icarus),
        ] {
            let toml = format!("simulator = \"{input}\"");
            let config: TestConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config.simulator, expected);
            assert_eq!(expected.name(), input);
        }
    }

    #[test]
    fn unknown_simulator_rejected() {
        let result: Result<TestConfig, _> = toml::from_str("simulator = \"modelsim\"");
        assert!(result.is_err());
    }

    #[test]
    fn verilator_traces_only_with_waves() {
        assert_eq!(
            Simulator::Verilator.extra_args(true),
            &["--trace", "--trace-structs"]
        );
        assert!(Simulator::Verilator.extra_args(false).is_empty());
        assert!(Simulator::Vcs.extra_args(true).is_empty());
    }

    #[test]
    fn pattern_list_semicolon_string() {
        let config: TestConfig = toml::from_str(r#"allowlist = "uart.*; clock.*;""#).unwrap();
        assert_eq!(config.allowlist, vec!["uart.*", "clock.*"]);
    }

    #[test]
    fn pattern_list_array() {
        let config: TestConfig = toml::from_str(r#"blacklist = ["parity.*", " "]"#).unwrap();
        assert_eq!(config.blacklist, vec!["parity.*"]);
    }

    #[test]
    fn pattern_list_empty_string_means_none() {
        let config: TestConfig = toml::from_str(r#"allowlist = """#).unwrap();
        assert!(config.allowlist.is_empty());
    }

    #[test]
    fn top_module_default_and_override() {
        let mut build = BuildConfig {
            board: "au200".into(),
            variant: "base".into(),
            fpga: "xcu200".into(),
            ..Default::default()
        };
        assert_eq!(build.top_module(), "efnet.nic.au200.base.xcu200.EfnetNic");
        assert_eq!(build.makefile(), "au200_base_xcu200.mk");
        build.module = Some("top.Custom".into());
        assert_eq!(build.top_module(), "top.Custom");
    }

    #[test]
    fn test_entry_defaults() {
        let entry: TestEntry = toml::from_str(r#"module = "pkg.Uart""#).unwrap();
        assert!(entry.params.is_empty());
        assert_eq!(entry.timescale, DEFAULT_TIMESCALE);
        assert!(!entry.waves);
        assert!(entry.testbench.is_none());
        assert!(!entry.disable);
    }
}
