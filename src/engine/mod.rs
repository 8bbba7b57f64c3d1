//! Core inference engine
//!
//! This module provides the classification pipeline:
//! - Backend: runs the model graph (ONNX Runtime)
//! - Predictor: preprocessing, forward pass and label lookup for one model
//! - ActiveModel: the swappable production model

mod active;
mod backend;
mod predictor;
pub mod preprocess;

#[cfg(test)]
pub(crate) mod testing;

pub use active::{ActiveModel, LoadedRun};
pub use backend::{BackendLoader, InferenceBackend, OrtBackend, OrtLoader};
pub use predictor::{Prediction, Predictor};
