//! Volume and model information command

use anyhow::Result;

use super::resolve_run;
use crate::config::ClassrConfig;
use crate::loader::{detect_model_source, ClassMap};

/// Show the volume layout and details of a run
pub async fn info(config: ClassrConfig, run_id: Option<String>) -> Result<()> {
    let storage = &config.storage;

    println!("Volume:     {}", storage.volume_dir.display());
    println!("Log file:   {}", storage.log_file().display());
    println!("Images:     {}", storage.images_dir().display());
    println!("Pointer:    {}", storage.pointer_file().display());

    let run_id = match resolve_run(&config, run_id.as_deref()) {
        Ok(run) => run,
        Err(e) => {
            println!("\nNo run selected: {}", e);
            return Ok(());
        }
    };

    let model_dir = storage.run_model_dir(&run_id);
    println!("\nRun:        {}", run_id);
    println!("Directory:  {}", model_dir.display());

    let source = detect_model_source(&model_dir, storage)?;
    let classes = ClassMap::load(&source.classes_path)?;
    let model_size = std::fs::metadata(&source.model_path)?.len();

    println!(
        "Model:      {} ({:.1} MB)",
        source.model_path.display(),
        model_size as f64 / (1024.0 * 1024.0)
    );
    println!(
        "Input:      {}x{} {:?}, {:?}",
        config.inference.height(),
        config.inference.width(),
        config.inference.layout,
        config.inference.normalization
    );
    println!("Classes:    {}", classes.len());
    for (index, label) in classes.iter() {
        println!("  {:>4}  {}", index, label);
    }

    Ok(())
}
