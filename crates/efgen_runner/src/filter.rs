//! Allowlist/blocklist selection of tests by module name.
//!
//! Patterns are regular expressions anchored at the start of the module name
//! (so `uart` selects `uart_tx`), compiled once at construction.

use efgen_config::{ConfigError, TestConfig};
use regex::Regex;

#[derive(Debug, Clone)]
enum Policy {
    All,
    Allow(Vec<Regex>),
    Block(Vec<Regex>),
}

/// Decides which tests are eligible to run.
#[derive(Debug, Clone)]
pub struct TestSelectionFilter {
    policy: Policy,
}

impl Default for TestSelectionFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl TestSelectionFilter {
    /// Builds a filter from allow and block patterns.
    ///
    /// The lists are mutually exclusive: passing both non-empty is a
    /// configuration error.
    pub fn new<S: AsRef<str>>(allow: &[S], block: &[S]) -> Result<Self, ConfigError> {
        let policy = match (allow.is_empty(), block.is_empty()) {
            (true, true) => Policy::All,
            (false, true) => Policy::Allow(compile(allow)?),
            (true, false) => Policy::Block(compile(block)?),
            (false, false) => {
                return Err(ConfigError::ConflictingFields {
                    first: "test.allowlist".to_string(),
                    second: "test.blacklist".to_string(),
                })
            }
        };
        Ok(Self { policy })
    }

    /// A filter that selects every test.
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::All,
        }
    }

    /// Builds a filter from the `[test]` table of `build.toml`.
    pub fn from_config(config: &TestConfig) -> Result<Self, ConfigError> {
        Self::new(config.allowlist.as_slice(), config.blacklist.as_slice())
    }

    /// Returns `true` if tests of `module` should run.
    pub fn allows(&self, module: &str) -> bool {
        match &self.policy {
            Policy::All => true,
            Policy::Allow(patterns) => patterns.iter().any(|p| p.is_match(module)),
            Policy::Block(patterns) => !patterns.iter().any(|p| p.is_match(module)),
        }
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(&format!("^(?:{p})")).map_err(|e| ConfigError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
