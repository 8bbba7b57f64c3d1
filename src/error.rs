//! Error types for model loading and inference

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for classr library operations
pub type Result<T> = std::result::Result<T, ClassrError>;

/// Kind of on-disk resource that may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    ModelDir,
    ModelFile,
    ClassMap,
    Image,
    RunPointer,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::ModelDir => "Model directory",
            Resource::ModelFile => "Model file",
            Resource::ClassMap => "Class map",
            Resource::Image => "Image",
            Resource::RunPointer => "Run pointer file",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading models or classifying images
#[derive(Error, Debug)]
pub enum ClassrError {
    /// A required file or directory does not exist
    #[error("{resource} not found: {}", path.display())]
    NotFound { resource: Resource, path: PathBuf },

    /// Gave up waiting for a resource to appear
    #[error("Timed out after {waited:?} waiting for {resource}: {}", path.display())]
    WaitTimeout {
        resource: Resource,
        path: PathBuf,
        waited: Duration,
    },

    /// Run identifier cannot name an artifact directory
    #[error("Invalid run id '{0}'")]
    InvalidRunId(String),

    /// Requested image name is not a plain file name
    #[error("Invalid image file name '{0}'")]
    InvalidFileName(String),

    /// Image could not be decoded
    #[error("Failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Class map exists but is unusable
    #[error("Invalid class map {}: {message}", path.display())]
    ClassMap { path: PathBuf, message: String },

    /// Model file exists but the runtime refused it
    #[error("Failed to load model {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },

    /// Forward pass or output extraction failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Predicted index has no label in the class map
    #[error("Class index {0} missing from class map")]
    UnknownClass(usize),

    /// Blocking worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassrError {
    pub fn not_found(resource: Resource, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            resource,
            path: path.into(),
        }
    }

    /// True for the missing-resource family of failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::WaitTimeout { .. })
            || matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<ort::Error> for ClassrError {
    fn from(e: ort::Error) -> Self {
        Self::Inference(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = ClassrError::not_found(Resource::Image, "/tmp/missing.jpg");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Image not found: /tmp/missing.jpg");

        let io = ClassrError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(io.is_not_found());

        assert!(!ClassrError::UnknownClass(3).is_not_found());
        assert!(!ClassrError::Inference("boom".into()).is_not_found());
    }
}
