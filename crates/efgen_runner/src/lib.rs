//! Test-matrix generation and execution for Chisel modules under cocotb.
//!
//! A [`TestRunGroup`] takes a list of [`TestCaseSpec`]s, keeps the ones its
//! [`TestSelectionFilter`] admits, expands each parameter set into a
//! [`ModuleDescriptor`](efgen_codegen::ModuleDescriptor) plus a generated
//! harness ([`TestMatrixExpander`]), elaborates every descriptor in one
//! [`CompilerDriverEmitter`] pass, and finally runs the test runner over the
//! generated files. [`FpgaProject`] wraps that flow with the board build.

#![warn(missing_docs)]

pub mod command;
pub mod emitter;
pub mod error;
pub mod expander;
pub mod filter;
pub mod fpga;
pub mod group;
pub mod spec;

pub use command::{CommandRunner, DryRunner, Invocation, SystemRunner, Toolchain};
pub use emitter::{CompilerDriverEmitter, DEFAULT_BUILD_TARGET, DRIVER_PATH};
pub use error::RunError;
pub use expander::TestMatrixExpander;
pub use filter::TestSelectionFilter;
pub use fpga::{FpgaOptions, FpgaProject};
pub use group::{Plan, RunReport, RunState, TestRunGroup};
pub use spec::TestCaseSpec;
