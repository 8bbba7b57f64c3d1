//! Shared volume layout

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClassrError, Result};
use crate::loader::RunId;

/// Location of logs, model runs and incoming images on the shared volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the shared volume
    #[serde(default = "default_volume_dir")]
    pub volume_dir: PathBuf,

    /// Experiment directory under `mlruns/` holding the run artifacts
    #[serde(default = "default_experiment_id")]
    pub experiment_id: String,

    /// Model file name inside a run's artifact directory
    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// Class map file name inside a run's artifact directory
    #[serde(default = "default_classes_file")]
    pub classes_file: String,
}

fn default_volume_dir() -> PathBuf {
    PathBuf::from("volume_data")
}

fn default_experiment_id() -> String {
    "157975935045122495".to_string()
}

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_classes_file() -> String {
    "classes.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            volume_dir: default_volume_dir(),
            experiment_id: default_experiment_id(),
            model_file: default_model_file(),
            classes_file: default_classes_file(),
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `volume_dir` with default names
    pub fn with_volume(volume_dir: impl Into<PathBuf>) -> Self {
        Self {
            volume_dir: volume_dir.into(),
            ..Default::default()
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.volume_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("inference.log")
    }

    pub fn mlruns_dir(&self) -> PathBuf {
        self.volume_dir.join("mlruns")
    }

    /// File whose content names the production run
    pub fn pointer_file(&self) -> PathBuf {
        self.mlruns_dir().join("prod_model_id.txt")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.volume_dir.join("temp_images")
    }

    /// Artifact directory of a run: `mlruns/<experiment>/<run>/artifacts/model`
    pub fn run_model_dir(&self, run_id: &RunId) -> PathBuf {
        self.mlruns_dir()
            .join(&self.experiment_id)
            .join(run_id.as_str())
            .join("artifacts")
            .join("model")
    }

    /// Resolve a client-supplied image name inside the images directory
    ///
    /// Only a single plain file name is accepted, so requests cannot read
    /// outside the images directory.
    pub fn image_path(&self, file_name: &str) -> Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.images_dir().join(name)),
            _ => Err(ClassrError::InvalidFileName(file_name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let storage = StorageConfig::with_volume("/data");
        let run = RunId::parse("abc123").unwrap();

        assert_eq!(storage.log_file(), PathBuf::from("/data/logs/inference.log"));
        assert_eq!(
            storage.pointer_file(),
            PathBuf::from("/data/mlruns/prod_model_id.txt")
        );
        assert_eq!(
            storage.run_model_dir(&run),
            PathBuf::from("/data/mlruns/157975935045122495/abc123/artifacts/model")
        );
    }

    #[test]
    fn test_image_path_rejects_traversal() {
        let storage = StorageConfig::with_volume("/data");
        assert_eq!(
            storage.image_path("cat.jpg").unwrap(),
            PathBuf::from("/data/temp_images/cat.jpg")
        );
        assert!(storage.image_path("../secrets.txt").is_err());
        assert!(storage.image_path("nested/cat.jpg").is_err());
        assert!(storage.image_path("/etc/passwd").is_err());
        assert!(storage.image_path("").is_err());
        assert!(storage.image_path(".").is_err());
    }
}
