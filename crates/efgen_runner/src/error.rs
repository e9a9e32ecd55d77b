//! Orchestration error types.
//!
//! Every variant is fatal: the run stops at the first error and the CLI turns
//! it into a non-zero process exit via [`RunError::exit_code`].

use std::io;
use std::path::{Path, PathBuf};

use efgen_config::ConfigError;

/// Errors that can occur while generating or running a test batch.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Malformed or contradictory configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// An expected directory is missing or is not a directory.
    #[error("{}: {reason}", .path.display())]
    Path {
        /// The offending path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The hardware compiler build returned a non-zero status.
    #[error("hardware compiler `{command}` failed ({})", describe_exit(.code))]
    CompilerInvocation {
        /// The command line that was run.
        command: String,
        /// The process exit code, `None` if killed by a signal.
        code: Option<i32>,
    },

    /// The test runner reported failures.
    #[error("test runner `{command}` failed ({})", describe_exit(.code))]
    TestExecution {
        /// The command line that was run.
        command: String,
        /// The process exit code, `None` if killed by a signal.
        code: Option<i32>,
    },

    /// The bitstream build returned a non-zero status.
    #[error("bitstream build `{command}` failed ({})", describe_exit(.code))]
    BitstreamBuild {
        /// The command line that was run.
        command: String,
        /// The process exit code, `None` if killed by a signal.
        code: Option<i32>,
    },

    /// An external program could not be started.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying launch error.
        #[source]
        source: io::Error,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The path being read, written, or removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Creates a [`RunError::Path`].
    pub fn path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RunError::Path {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns a closure that wraps an [`io::Error`] with the path it concerns.
    pub fn io_at(path: &Path) -> impl FnOnce(io::Error) -> RunError + '_ {
        move |source| RunError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The process exit code this error should terminate the CLI with.
    ///
    /// External failures propagate the external program's own code; all other
    /// errors (and signal terminations) map to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::CompilerInvocation { code, .. }
            | RunError::TestExecution { code, .. }
            | RunError::BitstreamBuild { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_propagates_external_status() {
        let err = RunError::TestExecution {
            command: "pytest".to_string(),
            code: Some(2),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn signal_termination_maps_to_one() {
        let err = RunError::CompilerInvocation {
            command: "mill rtlbuild.run".to_string(),
            code: None,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "hardware compiler `mill rtlbuild.run` failed (terminated by signal)"
        );
    }

    #[test]
    fn configuration_errors_exit_one() {
        let err: RunError = ConfigError::MissingField("build.board".to_string()).into();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "missing required field: build.board");
    }

    #[test]
    fn display_path_error() {
        let err = RunError::path("/tmp/tb", "not a directory");
        assert_eq!(err.to_string(), "/tmp/tb: not a directory");
    }

    #[test]
    fn display_test_execution() {
        let err = RunError::TestExecution {
            command: "pytest -n 4 /out".to_string(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "test runner `pytest -n 4 /out` failed (exit code 1)"
        );
    }
}
