//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating `build.toml` or `test.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Two mutually exclusive fields were both set.
    #[error("{first} and {second} can not be set at the same time")]
    ConflictingFields {
        /// The first field name.
        first: String,
        /// The second field name.
        second: String,
    },

    /// A test selection pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("build.board".to_string());
        assert_eq!(format!("{err}"), "missing required field: build.board");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("bad timescale".to_string());
        assert_eq!(format!("{err}"), "validation error: bad timescale");
    }

    #[test]
    fn display_conflicting_fields() {
        let err = ConfigError::ConflictingFields {
            first: "test.allowlist".to_string(),
            second: "test.blacklist".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "test.allowlist and test.blacklist can not be set at the same time"
        );
    }

    #[test]
    fn display_invalid_pattern() {
        let err = ConfigError::InvalidPattern {
            pattern: "uart(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(format!("{err}"), "invalid pattern 'uart(': unclosed group");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        let display = format!("{err}");
        assert!(display.starts_with("failed to read configuration:"));
    }
}
