//! Model artifact detection

use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::error::{ClassrError, Resource, Result};

/// Files making up one model artifact
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Artifact directory
    pub model_dir: PathBuf,
    /// Path to the ONNX graph
    pub model_path: PathBuf,
    /// Path to the class map sidecar
    pub classes_path: PathBuf,
}

/// Detect the model files inside an artifact directory
///
/// The configured model file name is preferred; otherwise the first `.onnx`
/// file in the directory is used.
pub fn detect_model_source(dir: &Path, storage: &StorageConfig) -> Result<ModelSource> {
    if !dir.exists() {
        return Err(ClassrError::not_found(Resource::ModelDir, dir));
    }

    let preferred = dir.join(&storage.model_file);
    let model_path = if preferred.is_file() {
        preferred
    } else {
        find_onnx_in_dir(dir).ok_or_else(|| ClassrError::not_found(Resource::ModelFile, &preferred))?
    };

    let classes_path = dir.join(&storage.classes_file);
    if !classes_path.is_file() {
        return Err(ClassrError::not_found(Resource::ClassMap, classes_path));
    }

    Ok(ModelSource {
        model_dir: dir.to_path_buf(),
        model_path,
        classes_path,
    })
}

/// Find an ONNX file in a directory
fn find_onnx_in_dir(dir: &Path) -> Option<PathBuf> {
    let pattern = dir.join("*.onnx");
    let mut found: Vec<PathBuf> = glob::glob(pattern.to_str()?)
        .ok()?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    found.sort();
    found.into_iter().next()
}
