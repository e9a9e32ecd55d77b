//! Expansion of a test case into per-parameter-set artifacts.
//!
//! Parameter set `i` of module `a.b.C` lands in `<out>/a_b_C/test{i}`, which
//! holds both the compiler output and the generated harness.

use std::path::{Path, PathBuf};

use efgen_codegen::{sanitize, CocotbHarness, ModuleDescriptor};
use efgen_config::Simulator;

use crate::spec::TestCaseSpec;

/// Expands [`TestCaseSpec`]s into descriptors and harnesses under one output root.
#[derive(Debug, Clone)]
pub struct TestMatrixExpander {
    out_dir: PathBuf,
    tb_dir: PathBuf,
    simulator: Simulator,
}

impl TestMatrixExpander {
    /// Creates an expander writing under `out_dir` for behavioral tests in `tb_dir`.
    pub fn new(
        out_dir: impl Into<PathBuf>,
        tb_dir: impl Into<PathBuf>,
        simulator: Simulator,
    ) -> Self {
        Self {
            out_dir: out_dir.into(),
            tb_dir: tb_dir.into(),
            simulator,
        }
    }

    /// Directory for parameter set `index` of `module`.
    pub fn target_dir(&self, module: &str, index: usize) -> PathBuf {
        self.out_dir
            .join(sanitize(module))
            .join(format!("test{index}"))
    }

    /// The output root.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Produces one harness (and its descriptor) per parameter set, in order.
    ///
    /// A spec without parameter sets expands to nothing.
    pub fn expand(&self, spec: &TestCaseSpec) -> Vec<CocotbHarness> {
        if spec.params().is_empty() {
            log::warn!("test {} has no parameter sets; skipping", spec.module());
            return Vec::new();
        }
        spec.params()
            .iter()
            .enumerate()
            .map(|(index, params)| {
                let descriptor = ModuleDescriptor::new(
                    spec.module(),
                    self.target_dir(spec.module(), index),
                    params.clone(),
                );
                CocotbHarness {
                    descriptor,
                    index,
                    simulator: self.simulator,
                    timescale: spec.timescale().to_string(),
                    waves: spec.waves(),
                    testbench: spec.testbench().to_string(),
                    tb_dir: self.tb_dir.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efgen_config::ParameterSet;
    use std::collections::HashSet;

    fn expander() -> TestMatrixExpander {
        TestMatrixExpander::new("/tb/out", "/tb", Simulator::Vcs)
    }

    fn width(w: i64) -> ParameterSet {
        [("width", w)].into_iter().collect()
    }

    #[test]
    fn empty_params_expand_to_nothing() {
        assert!(expander().expand(&TestCaseSpec::new("pkg.Uart")).is_empty());
    }

    #[test]
    fn one_harness_per_param_set() {
        let spec = TestCaseSpec::new("pkg.Uart")
            .with_params(width(8))
            .with_params(width(16))
            .with_params(width(32));
        let harnesses = expander().expand(&spec);
        assert_eq!(harnesses.len(), 3);
        for (i, h) in harnesses.iter().enumerate() {
            assert_eq!(h.index, i);
            assert_eq!(
                h.descriptor.target_dir(),
                Path::new(&format!("/tb/out/pkg_Uart/test{i}"))
            );
            assert_eq!(h.path().parent(), Some(h.descriptor.target_dir()));
        }
        assert_eq!(harnesses[1].descriptor.params(), &width(16));
        let paths: HashSet<_> = harnesses.iter().map(|h| h.path()).collect();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn same_last_segment_does_not_collide() {
        let e = expander();
        let a = e.expand(&TestCaseSpec::new("pkg.a.Foo").with_params(width(1)));
        let b = e.expand(&TestCaseSpec::new("pkg.b.Foo").with_params(width(1)));
        assert_ne!(a[0].descriptor.target_dir(), b[0].descriptor.target_dir());
        assert_ne!(a[0].path(), b[0].path());
    }

    #[test]
    fn spec_settings_flow_into_harness() {
        let spec = TestCaseSpec::new("pkg.Uart")
            .with_params(width(8))
            .with_timescale("10ns/10ps")
            .with_waves(true)
            .with_testbench("test_uart");
        let h = &expander().expand(&spec)[0];
        assert_eq!(h.timescale, "10ns/10ps");
        assert!(h.waves);
        assert_eq!(h.testbench, "test_uart");
        assert_eq!(h.tb_dir, PathBuf::from("/tb"));
        assert_eq!(h.simulator, Simulator::Vcs);
    }
}
