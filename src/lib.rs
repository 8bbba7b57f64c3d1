//! Classr - image classification inference server
//!
//! Classr serves a trained image classifier over HTTP and lets operators
//! hot-swap the production model without restarting the process.
//!
//! # Architecture
//!
//! - **loader**: run pointer, class map and model artifact discovery
//! - **engine**: preprocessing, ONNX Runtime inference, active model swapping
//! - **server**: HTTP endpoints
//! - **cli**: server entry point plus offline helpers
//!
//! # Volume Layout
//!
//! ```text
//! <volume>/
//!   logs/inference.log
//!   temp_images/<file_name>
//!   mlruns/prod_model_id.txt
//!   mlruns/<experiment>/<run_id>/artifacts/model/{model.onnx,classes.json}
//! ```
//!
//! # Example
//!
//! ```bash
//! # Start server
//! classr serve --volume /data --port 8000
//!
//! # Classify one image with a specific run
//! classr predict cat.png --run-id 0a1b2c
//!
//! # Promote a run while the server is down
//! classr promote run_id=0a1b2c
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod logging;
pub mod server;

// Re-export key types
pub use config::{ClassrConfig, InferenceConfig, ServerConfig, StorageConfig};
pub use engine::{ActiveModel, Prediction, Predictor};
pub use error::{ClassrError, Result};
pub use loader::{ClassMap, ModelSource, RunId};
