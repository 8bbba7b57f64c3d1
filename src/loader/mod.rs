//! Model artifact loading utilities
//!
//! This module knows the on-disk layout of a trained run:
//! - Artifact detection (ONNX graph + class map sidecar)
//! - Class map parsing
//! - The run pointer file naming the production run

mod classes;
mod detect;
mod pointer;

pub use classes::ClassMap;
pub use detect::{detect_model_source, ModelSource};
pub use pointer::{read_pointer, wait_for_pointer, write_pointer, RunId, RUN_ID_PREFIX};
