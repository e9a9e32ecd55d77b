//! Test case specifications.

use efgen_codegen::CocotbHarness;
use efgen_config::{
    is_identifier, is_qualified_name, validate_timescale, ConfigError, ParameterSet, TestEntry,
    DEFAULT_TIMESCALE,
};

/// One logical test: a module exercised under several parameter sets.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseSpec {
    module: String,
    params: Vec<ParameterSet>,
    timescale: String,
    waves: bool,
    testbench: String,
}

impl TestCaseSpec {
    /// Creates a spec for `module` with no parameter sets, the default
    /// timescale, and waveforms off.
    pub fn new(module: impl Into<String>) -> Self {
        let module = module.into();
        let testbench = CocotbHarness::default_testbench(&module);
        Self {
            module,
            params: Vec::new(),
            timescale: DEFAULT_TIMESCALE.to_string(),
            waves: false,
            testbench,
        }
    }

    /// Appends one parameter set.
    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.params.push(params);
        self
    }

    /// Sets the simulation timescale.
    pub fn with_timescale(mut self, timescale: impl Into<String>) -> Self {
        self.timescale = timescale.into();
        self
    }

    /// Enables or disables waveform capture.
    pub fn with_waves(mut self, waves: bool) -> Self {
        self.waves = waves;
        self
    }

    /// Overrides the behavioral test module name.
    pub fn with_testbench(mut self, testbench: impl Into<String>) -> Self {
        self.testbench = testbench.into();
        self
    }

    /// The qualified module name under test.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Parameter sets, in declaration order.
    pub fn params(&self) -> &[ParameterSet] {
        &self.params
    }

    /// Simulation timescale.
    pub fn timescale(&self) -> &str {
        &self.timescale
    }

    /// Whether waveforms are captured.
    pub fn waves(&self) -> bool {
        self.waves
    }

    /// Behavioral test module in the testbench directory.
    pub fn testbench(&self) -> &str {
        &self.testbench
    }

    /// Checks the invariants that the config loader enforces for file-based
    /// specs, for specs built in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_qualified_name(&self.module) {
            return Err(ConfigError::ValidationError(format!(
                "test module '{}' is not a qualified identifier",
                self.module
            )));
        }
        if !is_identifier(&self.testbench) {
            return Err(ConfigError::ValidationError(format!(
                "testbench '{}' is not a module name",
                self.testbench
            )));
        }
        if let Some(name) = self.params.iter().find_map(ParameterSet::first_invalid_name) {
            return Err(ConfigError::ValidationError(format!(
                "{}: parameter name '{name}' is not an identifier",
                self.module
            )));
        }
        validate_timescale(&self.timescale)
            .map_err(|reason| ConfigError::ValidationError(format!("{}: {reason}", self.module)))
    }
}

impl From<TestEntry> for TestCaseSpec {
    fn from(entry: TestEntry) -> Self {
        let testbench = entry
            .testbench
            .unwrap_or_else(|| CocotbHarness::default_testbench(&entry.module));
        Self {
            module: entry.module,
            params: entry.params,
            timescale: entry.timescale,
            waves: entry.waves,
            testbench,
        }
    }
}
