//! Active model lifecycle
//!
//! Owns the predictor currently in production and replaces it on demand.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::backend::BackendLoader;
use super::predictor::{Prediction, Predictor};
use crate::config::{ClassrConfig, InferenceConfig, StorageConfig};
use crate::error::Result;
use crate::loader::{self, RunId};

/// A predictor together with the run it was loaded from
pub struct LoadedRun {
    pub run_id: RunId,
    pub predictor: Predictor,
    pub loaded_at: DateTime<Utc>,
}

/// Swappable handle to the production model
///
/// Readers take an `Arc` snapshot and keep it for the duration of a request,
/// so a concurrent switch never affects an in-flight prediction. Switches
/// are serialized; the pointer file and the active run always agree once a
/// switch returns.
pub struct ActiveModel {
    current: ArcSwap<LoadedRun>,
    switch_lock: Mutex<()>,
    storage: StorageConfig,
    inference: InferenceConfig,
    loader: Arc<dyn BackendLoader>,
}

impl ActiveModel {
    /// Load `run_id` and make it the active model
    pub async fn load(
        run_id: RunId,
        storage: StorageConfig,
        inference: InferenceConfig,
        loader: Arc<dyn BackendLoader>,
    ) -> Result<Self> {
        let run = load_run(run_id, &storage, &inference, &loader).await?;
        Ok(Self {
            current: ArcSwap::from_pointee(run),
            switch_lock: Mutex::new(()),
            storage,
            inference,
            loader,
        })
    }

    /// Wait for the run pointer, then load the run it names
    pub async fn bootstrap(config: &ClassrConfig, loader: Arc<dyn BackendLoader>) -> Result<Self> {
        let pointer = config.storage.pointer_file();
        loader::wait_for_pointer(&pointer, &config.readiness).await?;

        let run_id = loader::read_pointer(&pointer)?;
        tracing::info!("Production run: {}", run_id);

        Self::load(
            run_id,
            config.storage.clone(),
            config.inference.clone(),
            loader,
        )
        .await
    }

    /// Snapshot of the active run
    pub fn current(&self) -> Arc<LoadedRun> {
        self.current.load_full()
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Classify an image with the active run
    ///
    /// Inference runs on the blocking pool. Returns the run that served the
    /// request alongside the prediction.
    pub async fn predict(&self, image_path: PathBuf) -> Result<(Arc<LoadedRun>, Prediction)> {
        let run = self.current();
        let worker = Arc::clone(&run);
        let prediction =
            tokio::task::spawn_blocking(move || worker.predictor.predict(&image_path)).await??;
        Ok((run, prediction))
    }

    /// Make `run_id` the production model
    ///
    /// The new predictor is built before anything changes; if loading fails,
    /// the pointer file and the active run are left as they were.
    pub async fn switch(&self, run_id: RunId) -> Result<Arc<LoadedRun>> {
        let _guard = self.switch_lock.lock().await;

        let run = Arc::new(load_run(run_id, &self.storage, &self.inference, &self.loader).await?);
        let pointer = self.storage.pointer_file();
        let run_id = run.run_id.clone();
        tokio::task::spawn_blocking(move || loader::write_pointer(&pointer, &run_id)).await??;
        let previous = self.current.swap(Arc::clone(&run));

        tracing::info!("Switched model: {} -> {}", previous.run_id, run.run_id);
        Ok(run)
    }
}

async fn load_run(
    run_id: RunId,
    storage: &StorageConfig,
    inference: &InferenceConfig,
    loader: &Arc<dyn BackendLoader>,
) -> Result<LoadedRun> {
    let model_dir = storage.run_model_dir(&run_id);
    let storage = storage.clone();
    let inference = inference.clone();
    let loader = Arc::clone(loader);

    tracing::info!("Loading run {} from {}", run_id, model_dir.display());
    let predictor = tokio::task::spawn_blocking(move || {
        Predictor::load_with(&model_dir, &storage, &inference, loader.as_ref())
    })
    .await??;

    Ok(LoadedRun {
        run_id,
        predictor,
        loaded_at: Utc::now(),
    })
}
