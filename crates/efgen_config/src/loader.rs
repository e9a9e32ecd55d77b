//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::params::{is_identifier, is_qualified_name, ParameterSet};
use crate::types::{BuildFile, TestEntry, TestSuite};
use std::path::Path;

/// Loads and validates `<project_dir>/build.toml`.
pub fn load_build_file(project_dir: &Path) -> Result<BuildFile, ConfigError> {
    let config_path = project_dir.join("build.toml");
    log::info!("Loading build config from {}", config_path.display());
    let content = std::fs::read_to_string(&config_path)?;
    load_build_file_from_str(&content)
}

/// Parses and validates a `build.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_build_file_from_str(content: &str) -> Result<BuildFile, ConfigError> {
    let config: BuildFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_build_file(&config)?;
    Ok(config)
}

/// Loads and validates a `test.toml` test list.
///
/// Disabled entries are dropped here so that downstream code only sees tests
/// that should run.
pub fn load_test_suite(path: &Path) -> Result<TestSuite, ConfigError> {
    log::info!("Loading test list from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    load_test_suite_from_str(&content)
}

/// Parses and validates a `test.toml` test list from a string.
pub fn load_test_suite_from_str(content: &str) -> Result<TestSuite, ConfigError> {
    let mut suite: TestSuite =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    for (i, entry) in suite.tests.iter().enumerate() {
        validate_test_entry(i, entry)?;
    }
    suite.tests.retain(|entry| {
        if entry.disable {
            log::info!("Skipping disabled test {}", entry.module);
        }
        !entry.disable
    });
    Ok(suite)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_build_file(config: &BuildFile) -> Result<(), ConfigError> {
    let build = &config.build;
    for (field, value) in [
        ("build.board", &build.board),
        ("build.variant", &build.variant),
        ("build.fpga", &build.fpga),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    let top = build.top_module();
    if !is_qualified_name(&top) {
        return Err(ConfigError::ValidationError(format!(
            "top module '{top}' is not a qualified identifier"
        )));
    }
    validate_params("build.params", &build.params)?;

    let test = &config.test;
    if !test.allowlist.is_empty() && !test.blacklist.is_empty() {
        return Err(ConfigError::ConflictingFields {
            first: "test.allowlist".to_string(),
            second: "test.blacklist".to_string(),
        });
    }
    Ok(())
}

fn validate_test_entry(index: usize, entry: &TestEntry) -> Result<(), ConfigError> {
    if entry.module.is_empty() {
        return Err(ConfigError::MissingField(format!("tests[{index}].module")));
    }
    if !is_qualified_name(&entry.module) {
        return Err(ConfigError::ValidationError(format!(
            "tests[{index}].module '{}' is not a qualified identifier",
            entry.module
        )));
    }
    for (i, params) in entry.params.iter().enumerate() {
        validate_params(&format!("tests[{index}].params[{i}]"), params)?;
    }
    validate_timescale(&entry.timescale).map_err(|reason| {
        ConfigError::ValidationError(format!("tests[{index}].timescale: {reason}"))
    })?;
    if let Some(tb) = &entry.testbench {
        if !is_identifier(tb) {
            return Err(ConfigError::ValidationError(format!(
                "tests[{index}].testbench '{tb}' is not a module name"
            )));
        }
    }
    Ok(())
}

fn validate_params(field: &str, params: &ParameterSet) -> Result<(), ConfigError> {
    match params.first_invalid_name() {
        Some(name) => Err(ConfigError::ValidationError(format!(
            "{field}: parameter name '{name}' is not an identifier"
        ))),
        None => Ok(()),
    }
}

/// Checks a `<unit>/<precision>` timescale such as `1ns/1ps`.
///
/// Each half is a magnitude of 1, 10, or 100 followed by one of
/// `fs`, `ps`, `ns`, `us`, `ms`, `s`.
pub fn validate_timescale(s: &str) -> Result<(), String> {
    let (unit, precision) = s
        .split_once('/')
        .ok_or_else(|| format!("'{s}' is not of the form <unit>/<precision>"))?;
    for part in [unit, precision] {
        let part = part.trim();
        let digit_end = part
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(part.len());
        let (magnitude, suffix) = part.split_at(digit_end);
        if !matches!(magnitude, "1" | "10" | "100") {
            return Err(format!("invalid magnitude in '{part}'"));
        }
        if !matches!(suffix.trim(), "fs" | "ps" | "ns" | "us" | "ms" | "s") {
            return Err(format!("invalid time unit in '{part}'"));
        }
    }
    Ok(())
}
