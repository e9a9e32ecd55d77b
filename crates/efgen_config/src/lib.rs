//! Parsing and validation of `build.toml` and `test.toml` configuration files.
//!
//! This crate reads the FPGA project configuration and the test list and
//! produces strongly-typed [`BuildFile`] and [`TestSuite`] values. All checks
//! happen at load time so that consumers never see a half-valid config.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod params;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_build_file, load_build_file_from_str, load_test_suite, load_test_suite_from_str,
    validate_timescale,
};
pub use params::{is_identifier, is_qualified_name, ParamValue, ParameterSet};
pub use types::*;
