//! Test fixtures: a JSON-backed model stand-in and volume helpers

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use ndarray::Array4;

use super::backend::{BackendLoader, InferenceBackend};
use crate::config::{InferenceConfig, StorageConfig, TensorLayout};
use crate::error::{ClassrError, Result};
use crate::loader::{ModelSource, RunId};

/// Loads "models" whose file holds the JSON array returned by every forward pass
pub struct FixtureLoader;

struct FixtureBackend {
    output: Vec<f32>,
    expected_shape: [usize; 4],
}

impl BackendLoader for FixtureLoader {
    fn load(
        &self,
        source: &ModelSource,
        config: &InferenceConfig,
    ) -> Result<Box<dyn InferenceBackend>> {
        let content = std::fs::read_to_string(&source.model_path)?;
        let output = serde_json::from_str(&content).map_err(|e| ClassrError::ModelLoad {
            path: source.model_path.clone(),
            message: e.to_string(),
        })?;

        let (h, w) = (config.height() as usize, config.width() as usize);
        let expected_shape = match config.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        };

        Ok(Box::new(FixtureBackend {
            output,
            expected_shape,
        }))
    }
}

impl InferenceBackend for FixtureBackend {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        if input.shape() != &self.expected_shape[..] {
            return Err(ClassrError::Inference(format!(
                "unexpected input shape {:?}",
                input.shape()
            )));
        }
        Ok(self.output.clone())
    }
}

/// Create a run's artifact directory with a fixture model and class map
pub fn write_run(storage: &StorageConfig, run: &str, output: &[f32], labels: &[&str]) -> PathBuf {
    let model_dir = storage.run_model_dir(&RunId::parse(run).unwrap());
    std::fs::create_dir_all(&model_dir).unwrap();

    std::fs::write(
        model_dir.join(&storage.model_file),
        serde_json::to_string(output).unwrap(),
    )
    .unwrap();

    let classes: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (i.to_string(), serde_json::Value::from(*l)))
        .collect();
    std::fs::write(
        model_dir.join(&storage.classes_file),
        serde_json::to_string(&classes).unwrap(),
    )
    .unwrap();

    model_dir
}

/// Write a small PNG into the images directory and return its path
pub fn write_image(storage: &StorageConfig, name: &str) -> PathBuf {
    let dir = storage.images_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    RgbImage::from_pixel(40, 30, Rgb([200, 120, 40]))
        .save(&path)
        .unwrap();
    path
}
