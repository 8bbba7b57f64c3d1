//! One-shot classification command

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::resolve_run;
use crate::config::ClassrConfig;
use crate::engine::Predictor;

/// Classify a single image and print the result
pub async fn predict(
    config: ClassrConfig,
    image: PathBuf,
    run_id: Option<String>,
    json: bool,
) -> Result<()> {
    let run_id = resolve_run(&config, run_id.as_deref())?;
    let model_dir = config.storage.run_model_dir(&run_id);

    tracing::info!("Loading run {} from {}", run_id, model_dir.display());

    let prediction = tokio::task::spawn_blocking(move || {
        let predictor = Predictor::load(&model_dir, &config.storage, &config.inference)?;
        predictor.predict(&image)
    })
    .await?
    .context("classification failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{} ({:.4})", prediction.label, prediction.score);
    }

    Ok(())
}
