//! CLI-specific error types and exit codes.

use civman_catalog::CatalogError;
use civman_civitai::CivitaiError;
use civman_core::{CivitaiPortError, ConfigError, DownloadError, PathError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or input validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog file could not be read or written.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Platform request failed.
    #[error("{0}")]
    Network(String),

    /// One or more downloads did not complete.
    #[error("{0}")]
    Download(String),

    /// The user pressed Ctrl-C.
    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Codes follow sysexits.h where a category fits:
    /// - 1: General error
    /// - 2: Invalid arguments
    /// - 73: Catalog could not be written (`EX_CANTCREAT`)
    /// - 74: `EX_IOERR`
    /// - 78: `EX_CONFIG`
    /// - 130: Interrupted by SIGINT
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Network(_) | Self::Download(_) => 1,
            Self::Arguments(_) => 2,
            Self::Catalog(_) => 73,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
            Self::Interrupted => 130,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) | CatalogError::InvalidField { .. } => {
                Self::Arguments(err.to_string())
            }
            CatalogError::MissingRoot(_) => Self::Config(err.to_string()),
            _ => Self::Catalog(err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Configuration { .. } => Self::Config(err.user_message()),
            DownloadError::InvalidUrl { .. } => Self::Arguments(err.user_message()),
            _ => Self::Download(err.user_message()),
        }
    }
}

impl From<CivitaiPortError> for CliError {
    fn from(err: CivitaiPortError) -> Self {
        match err {
            CivitaiPortError::InvalidInput { .. } => Self::Arguments(err.to_string()),
            CivitaiPortError::Io { .. } => Self::Io(err.to_string()),
            _ => Self::Network(err.to_string()),
        }
    }
}

impl From<CivitaiError> for CliError {
    fn from(err: CivitaiError) -> Self {
        match err {
            CivitaiError::ClientBuild(_) | CivitaiError::InvalidUrl(_) => {
                Self::Config(err.to_string())
            }
            _ => Self::Network(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned by a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>()
        .map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Catalog("x".into()).exit_code(), 73);
        assert_eq!(CliError::Download("x".into()).exit_code(), 1);
        assert_eq!(CliError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_catalog_not_found_is_an_argument_error() {
        let err: CliError = CatalogError::NotFound(42).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_port_errors_map_by_kind() {
        let err: CliError = CivitaiPortError::RateLimited.into();
        assert!(matches!(err, CliError::Network(_)));
        let err: CliError = CivitaiPortError::Io {
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_anyhow_downcast() {
        let err = anyhow::Error::new(CliError::Interrupted);
        assert_eq!(exit_code_for(&err), 130);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
