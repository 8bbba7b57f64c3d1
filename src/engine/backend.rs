//! Inference backends
//!
//! `InferenceBackend` is the seam between the predictor and the runtime that
//! executes the graph. The production implementation runs ONNX Runtime.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use ort::value::TensorRef;

use crate::config::{DeviceConfig, InferenceConfig};
use crate::error::{ClassrError, Result};
use crate::loader::ModelSource;

/// Executes a forward pass on a single-image batch
pub trait InferenceBackend: Send + Sync {
    /// Run the model and return the flattened first output
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

/// Opens a backend for a detected model artifact
pub trait BackendLoader: Send + Sync {
    fn load(
        &self,
        source: &ModelSource,
        config: &InferenceConfig,
    ) -> Result<Box<dyn InferenceBackend>>;
}

/// Loader producing ONNX Runtime backends
#[derive(Debug, Default, Clone, Copy)]
pub struct OrtLoader;

impl BackendLoader for OrtLoader {
    fn load(
        &self,
        source: &ModelSource,
        config: &InferenceConfig,
    ) -> Result<Box<dyn InferenceBackend>> {
        Ok(Box::new(OrtBackend::open(&source.model_path, config)?))
    }
}

/// ONNX Runtime session wrapper
pub struct OrtBackend {
    /// Running a session needs `&mut`
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
}

impl OrtBackend {
    /// Create a session for `model_path` on the configured device
    pub fn open(model_path: &Path, config: &InferenceConfig) -> Result<Self> {
        let load_error = |message: String| ClassrError::ModelLoad {
            path: model_path.to_path_buf(),
            message,
        };

        let builder = Session::builder().map_err(|e| load_error(e.to_string()))?;
        let builder = configure_session(builder, config).map_err(|e| load_error(e.to_string()))?;
        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| load_error(e.to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| load_error("model declares no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| load_error("model declares no outputs".to_string()))?;

        tracing::debug!(
            "ONNX session ready for {} (input '{}', output '{}')",
            model_path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input
            .as_slice()
            .ok_or_else(|| ClassrError::Inference("input tensor is not contiguous".to_string()))?;
        let tensor = TensorRef::from_array_view((dims, data))?;

        let mut session = self.session.lock().map_err(|_| {
            ClassrError::Inference(format!(
                "session lock poisoned for {}",
                self.model_path.display()
            ))
        })?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;
        let (_, scores) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;

        Ok(scores.to_vec())
    }
}

fn configure_session(
    mut builder: SessionBuilder,
    config: &InferenceConfig,
) -> std::result::Result<SessionBuilder, ort::Error> {
    if let Some(threads) = config.intra_threads {
        builder = builder.with_intra_threads(threads)?;
    }
    let providers = execution_providers(&config.device, config.memory_growth);
    builder.with_execution_providers(providers)
}

/// Execution providers in order of preference, CPU always last
///
/// With `memory_growth` the CUDA arena grows by exactly what each allocation
/// requests instead of reserving power-of-two chunks up front.
fn execution_providers(device: &DeviceConfig, memory_growth: bool) -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::new();

    #[cfg(feature = "cuda")]
    if device.wants_accelerator() {
        use ort::execution_providers::{ArenaExtendStrategy, CUDAExecutionProvider};

        let mut cuda = CUDAExecutionProvider::default().with_device_id(device.device_id() as i32);
        if memory_growth {
            cuda = cuda.with_arena_extend_strategy(ArenaExtendStrategy::SameAsRequested);
        }
        providers.push(cuda.build());
        tracing::info!(
            "CUDA device {} configured (memory growth: {})",
            device.device_id(),
            memory_growth
        );
    }

    #[cfg(not(feature = "cuda"))]
    {
        let _ = memory_growth;
        if device.device_type() == "cuda" {
            tracing::warn!("CUDA requested but classr was built without the `cuda` feature, using CPU");
        }
    }

    providers.push(CPUExecutionProvider::default().build());
    providers
}
