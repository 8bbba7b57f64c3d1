//! Single-image classifier
//!
//! Wraps one model artifact: the inference backend, its class map and the
//! preprocessing settings it was exported with.

use std::path::Path;

use serde::Serialize;

use super::backend::{BackendLoader, InferenceBackend, OrtLoader};
use super::preprocess;
use crate::config::{InferenceConfig, OutputActivation, StorageConfig};
use crate::error::{ClassrError, Resource, Result};
use crate::loader::{detect_model_source, ClassMap, ModelSource};

/// Top-1 classification result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Class label from the class map
    pub label: String,
    /// Probability of the label
    pub score: f32,
    /// Class index in the model output
    pub index: usize,
}

/// Loaded model ready to classify images
pub struct Predictor {
    backend: Box<dyn InferenceBackend>,
    classes: ClassMap,
    config: InferenceConfig,
    source: ModelSource,
}

impl Predictor {
    /// Load the model stored in `model_dir` with ONNX Runtime
    pub fn load(model_dir: &Path, storage: &StorageConfig, config: &InferenceConfig) -> Result<Self> {
        Self::load_with(model_dir, storage, config, &OrtLoader)
    }

    /// Load the model stored in `model_dir` with an explicit backend loader
    ///
    /// Fails with a not-found error when the directory, model file or class
    /// map is missing. When `config.warmup_image` is set the new predictor
    /// must classify it successfully.
    pub fn load_with(
        model_dir: &Path,
        storage: &StorageConfig,
        config: &InferenceConfig,
        loader: &dyn BackendLoader,
    ) -> Result<Self> {
        let source = detect_model_source(model_dir, storage)?;

        let predictor = Self::open(source, config, loader).map_err(|e| {
            tracing::error!("Model initialization failed for {}: {}", model_dir.display(), e);
            e
        })?;

        tracing::info!(
            "Model loaded from {} ({} classes)",
            predictor.source.model_path.display(),
            predictor.classes.len()
        );

        if let Some(ref warmup) = config.warmup_image {
            let prediction = predictor.predict(warmup)?;
            tracing::debug!("Warmup prediction: {} ({:.4})", prediction.label, prediction.score);
        }

        Ok(predictor)
    }

    fn open(source: ModelSource, config: &InferenceConfig, loader: &dyn BackendLoader) -> Result<Self> {
        let classes = ClassMap::load(&source.classes_path)?;
        let backend = loader.load(&source, config)?;
        Ok(Self {
            backend,
            classes,
            config: config.clone(),
            source,
        })
    }

    /// Classify the image at `image_path`
    pub fn predict(&self, image_path: &Path) -> Result<Prediction> {
        if !image_path.exists() {
            return Err(ClassrError::not_found(Resource::Image, image_path));
        }

        match self.classify(image_path) {
            Ok(prediction) => {
                tracing::info!(
                    "Prediction done: class = {}, score = {}",
                    prediction.label,
                    prediction.score
                );
                Ok(prediction)
            }
            Err(e) => {
                tracing::error!("Prediction failed for {}: {}", image_path.display(), e);
                Err(e)
            }
        }
    }

    fn classify(&self, image_path: &Path) -> Result<Prediction> {
        let image = preprocess::load_image(image_path)?;
        let input = preprocess::image_to_tensor(&image, &self.config);

        let mut scores = self.backend.forward(&input)?;
        if self.config.output_activation == OutputActivation::Softmax {
            softmax(&mut scores);
        }

        let (index, score) = top1(&scores)?;
        let label = self
            .classes
            .label(index)
            .ok_or(ClassrError::UnknownClass(index))?;

        Ok(Prediction {
            label: label.to_string(),
            score,
            index,
        })
    }

    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }
}

/// Index and value of the highest score
fn top1(scores: &[f32]) -> Result<(usize, f32)> {
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ClassrError::Inference("model produced non-finite scores".to_string()));
    }

    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .ok_or_else(|| ClassrError::Inference("model produced an empty output".to_string()))
}

fn softmax(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    if sum > 0.0 {
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{write_image, write_run, FixtureLoader};
    use crate::loader::RunId;

    fn fixture(output: &[f32]) -> (tempfile::TempDir, StorageConfig, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig::with_volume(dir.path());
        let model_dir = write_run(&storage, "run-a", output, &["cat", "dog", "bird"]);
        (dir, storage, model_dir)
    }

    #[test]
    fn test_predict_returns_known_label_and_probability() {
        let (_dir, storage, model_dir) = fixture(&[0.1, 0.7, 0.2]);
        let predictor =
            Predictor::load_with(&model_dir, &storage, &InferenceConfig::default(), &FixtureLoader)
                .unwrap();
        let image = write_image(&storage, "dog.png");

        let prediction = predictor.predict(&image).unwrap();

        assert_eq!(prediction.label, "dog");
        assert_eq!(prediction.index, 1);
        assert!(predictor.classes().contains_label(&prediction.label));
        assert!((0.0..=1.0).contains(&prediction.score));
        assert!((prediction.score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_predict_missing_image_is_not_found() {
        let (_dir, storage, model_dir) = fixture(&[0.5, 0.3, 0.2]);
        let predictor =
            Predictor::load_with(&model_dir, &storage, &InferenceConfig::default(), &FixtureLoader)
                .unwrap();

        let err = predictor
            .predict(&storage.images_dir().join("missing.jpg"))
            .unwrap_err();
        assert!(matches!(
            err,
            ClassrError::NotFound {
                resource: Resource::Image,
                ..
            }
        ));
    }

    #[test]
    fn test_load_missing_model_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig::with_volume(dir.path());
        let missing = storage.run_model_dir(&RunId::parse("nope").unwrap());

        let err = Predictor::load_with(&missing, &storage, &InferenceConfig::default(), &FixtureLoader)
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_softmax_activation() {
        let (_dir, storage, model_dir) = fixture(&[1.0, 3.0, 2.0]);
        let config = InferenceConfig {
            output_activation: OutputActivation::Softmax,
            ..Default::default()
        };
        let predictor = Predictor::load_with(&model_dir, &storage, &config, &FixtureLoader).unwrap();
        let image = write_image(&storage, "x.png");

        let prediction = predictor.predict(&image).unwrap();
        assert_eq!(prediction.label, "dog");
        assert!(prediction.score > 0.5 && prediction.score < 1.0);
    }

    #[test]
    fn test_unknown_class_index() {
        let (_dir, storage, model_dir) = fixture(&[0.1, 0.1, 0.1, 0.7]);
        let predictor =
            Predictor::load_with(&model_dir, &storage, &InferenceConfig::default(), &FixtureLoader)
                .unwrap();
        let image = write_image(&storage, "x.png");

        assert!(matches!(
            predictor.predict(&image),
            Err(ClassrError::UnknownClass(3))
        ));
    }

    #[test]
    fn test_warmup_failure_aborts_load() {
        let (_dir, storage, model_dir) = fixture(&[0.1, 0.9]);
        let config = InferenceConfig {
            warmup_image: Some(storage.images_dir().join("absent.jpg")),
            ..Default::default()
        };

        let err = Predictor::load_with(&model_dir, &storage, &config, &FixtureLoader)
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_top1_edge_cases() {
        assert_eq!(top1(&[0.2, 0.5, 0.5]).unwrap(), (1, 0.5));
        assert!(top1(&[]).is_err());
        assert!(top1(&[0.1, f32::NAN]).is_err());
    }
}
