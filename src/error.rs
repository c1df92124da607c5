use std::io;

use thiserror::Error;

/// Every way a filter pass can fail.
///
/// None of these are recoverable where they are raised; they travel up to
/// the binary, which prints a diagnostic and exits non-zero.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid image format: {0}")]
    Format(String),

    #[error("Unsupported max channel value {found} (expected {expected})")]
    Range { found: u32, expected: u32 },

    #[error("Truncated raster: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Format,
    Io,
    Resource,
}

impl FilterError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::Config(_) => ErrorKind::Configuration,
            FilterError::Format(_) | FilterError::Range { .. } => ErrorKind::Format,
            FilterError::Truncated { .. } | FilterError::Io(_) => ErrorKind::Io,
            FilterError::Spawn { .. } => ErrorKind::Resource,
        }
    }
}

impl From<toml::de::Error> for FilterError {
    fn from(err: toml::de::Error) -> Self {
        FilterError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let error = FilterError::Range {
            found: 65535,
            expected: 255,
        };
        let display = format!("{}", error);
        assert!(display.contains("65535"));
        assert!(display.contains("255"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(FilterError::config("zero").kind(), ErrorKind::Configuration);
        assert_eq!(FilterError::format("P3").kind(), ErrorKind::Format);
        assert_eq!(
            FilterError::Range { found: 1, expected: 255 }.kind(),
            ErrorKind::Format
        );
        assert_eq!(
            FilterError::Truncated { expected: 12, actual: 3 }.kind(),
            ErrorKind::Io
        );
        let spawn = FilterError::Spawn {
            worker: 0,
            source: io::Error::new(io::ErrorKind::OutOfMemory, "no threads"),
        };
        assert_eq!(spawn.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            std::fs::File::open("/definitely/not/here/missing.ppm")?;
            Ok(())
        }
        let err = open().unwrap_err();
        assert!(matches!(err, FilterError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
