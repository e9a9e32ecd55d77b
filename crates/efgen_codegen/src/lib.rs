//! Source generators for the Chisel driver and the cocotb harnesses.
//!
//! Generated text is built through [`CodeWriter`] and the per-language
//! [`LiteralSyntax`] renderers, never by splicing pre-indented strings.

#![warn(missing_docs)]

pub mod chisel;
pub mod cocotb;
pub mod literal;
pub mod writer;

pub use chisel::{render_driver, sanitize, toplevel, ModuleDescriptor};
pub use cocotb::{CocotbHarness, BEHAVIORAL_ENTRY};
pub use literal::{LiteralSyntax, Python, Scala};
pub use writer::CodeWriter;
