//! Typed errors raised at the edges of the application: configuration and
//! dataset input. The layout engine itself never returns errors.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed wrapper for `figment::Error` to keep `Result` small on the stack.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct FigmentError(#[from] Box<figment::Error>);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve configuration: {0}")]
    Resolve(#[from] FigmentError),

    #[error("config file {0} does not exist")]
    Missing(PathBuf),

    #[error("invalid layout setting `{field}`: {reason}")]
    InvalidLayout { field: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Resolve(FigmentError(Box::new(err)))
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset JSON")]
    Parse(#[from] serde_json::Error),

    #[error("dataset contains no nodes")]
    Empty,
}
