//! Application-wide error types.

use thiserror::Error;

/// Errors that stop a stage of the run rather than a single entity.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A legacy database file could not be opened.
    #[error("Legacy source unavailable: {0}")]
    SourceUnavailable(String),

    /// The destination database could not be reached.
    #[error("Database error: {0}")]
    Database(String),

    /// A report file could not be written.
    #[error("Report error: {0}")]
    Report(String),
}

impl AppError {
    /// Returns the process exit status used when this error ends the run.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::SourceUnavailable(_) | Self::Database(_) | Self::Report(_) => 1,
        }
    }

    /// Returns the stable error code written to the run report.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Report(_) => "REPORT_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config(String::new()).exit_code(), 2);
        assert_eq!(AppError::SourceUnavailable(String::new()).exit_code(), 1);
        assert_eq!(AppError::Database(String::new()).exit_code(), 1);
        assert_eq!(AppError::Report(String::new()).exit_code(), 1);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Config(String::new()).error_code(), "CONFIG_ERROR");
        assert_eq!(
            AppError::SourceUnavailable(String::new()).error_code(),
            "SOURCE_UNAVAILABLE"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(AppError::Report(String::new()).error_code(), "REPORT_ERROR");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Config("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(
            AppError::SourceUnavailable("msg".into()).to_string(),
            "Legacy source unavailable: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
        assert_eq!(
            AppError::Report("msg".into()).to_string(),
            "Report error: msg"
        );
    }

    #[test]
    fn test_from_config_error() {
        let err: AppError = config::ConfigError::Message("bad".into()).into();
        assert!(matches!(err, AppError::Config(ref m) if m == "bad"));
    }
}
