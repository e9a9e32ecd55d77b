//! Chisel elaboration driver.
//!
//! A [`ModuleDescriptor`] records one compiler invocation: which module to
//! elaborate, with which parameters, and where the SystemVerilog goes.
//! [`render_driver`] batches any number of descriptors into one `main.scala`
//! so the external build tool only starts once.

use std::path::{Path, PathBuf};

use efgen_config::ParameterSet;
use serde::Serialize;

use crate::literal::{LiteralSyntax, Scala};
use crate::writer::CodeWriter;

/// One hardware compiler invocation target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    module: String,
    target_dir: PathBuf,
    params: ParameterSet,
}

impl ModuleDescriptor {
    /// Creates a descriptor for `module` elaborated with `params` into `target_dir`.
    pub fn new(
        module: impl Into<String>,
        target_dir: impl Into<PathBuf>,
        params: ParameterSet,
    ) -> Self {
        Self {
            module: module.into(),
            target_dir: target_dir.into(),
            params,
        }
    }

    /// The qualified module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The directory the compiler writes SystemVerilog into.
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// The parameters the module is instantiated with.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// The unqualified module name, which is also the emitted toplevel.
    pub fn toplevel(&self) -> &str {
        toplevel(&self.module)
    }

    /// Path of the SystemVerilog file the compiler emits for this descriptor.
    pub fn verilog_path(&self) -> PathBuf {
        self.target_dir.join(format!("{}.sv", self.toplevel()))
    }

    /// Renders the single Scala statement that elaborates this descriptor.
    pub fn render(&self) -> String {
        let args: Vec<String> = self
            .params
            .iter()
            .map(|(name, value)| format!("{name} = {}", Scala.value(value)))
            .collect();
        format!(
            "circt.stage.ChiselStage.emitSystemVerilogFile(new {}({}), Array(\"--target-dir\", {}))",
            self.module,
            args.join(", "),
            Scala.string(&self.target_dir.to_string_lossy()),
        )
    }
}

/// Returns the last dotted component of a qualified module name.
pub fn toplevel(module: &str) -> &str {
    module.rsplit('.').next().unwrap_or(module)
}

/// Turns a qualified module name into a directory- and import-safe token by
/// joining every component with `_`.
///
/// The full name is kept so that `pkg.a.Foo` and `pkg.b.Foo` never share
/// output paths.
pub fn sanitize(module: &str) -> String {
    module.split('.').collect::<Vec<_>>().join("_")
}

/// Renders the complete driver source for a batch of descriptors, one
/// statement per descriptor in input order.
pub fn render_driver(descriptors: &[ModuleDescriptor]) -> String {
    let mut w = CodeWriter::new("  ");
    w.line("package main");
    w.blank();
    w.line("import chisel3._");
    w.blank();
    w.braced("object Main extends App {", "}", |w| {
        for descriptor in descriptors {
            w.line(descriptor.render());
        }
    });
    w.finish()
}
