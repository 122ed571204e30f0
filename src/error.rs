//! Error types for loading shader containers.
//!
//! Only the container can fail to load. Defects in the shader body itself are repaired
//! best-effort by [`crate::repair`] and never surface here.

use std::path::PathBuf;

/// A specialized Result type for container loading.
pub type ContainerResult<T> = Result<T, ContainerError>;

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("failed to read shader container at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode shader container: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("shader container contains no passes")]
    EmptyPassList,
}

impl ContainerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContainerError::Io {
            path: path.into(),
            source,
        }
    }
}
