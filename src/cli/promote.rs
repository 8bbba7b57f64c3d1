//! Promote a run to production offline

use anyhow::Result;

use crate::config::ClassrConfig;
use crate::loader::{self, detect_model_source, RunId};

/// Write the run pointer after checking the run's artifacts exist
///
/// A running server only reads the pointer at startup; use `/switchmodel`
/// to change the model of a live server.
pub async fn promote(config: ClassrConfig, run_id: String) -> Result<()> {
    let run_id = RunId::parse(&run_id)?;
    let model_dir = config.storage.run_model_dir(&run_id);
    let source = detect_model_source(&model_dir, &config.storage)?;

    let pointer = config.storage.pointer_file();
    loader::write_pointer(&pointer, &run_id)?;

    println!("Promoted run {} ({})", run_id, source.model_path.display());
    println!("Pointer: {}", pointer.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::write_run;

    #[tokio::test]
    async fn test_promote_writes_pointer_for_existing_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClassrConfig::resolve(None, Some(dir.path().to_path_buf())).unwrap();
        write_run(&config.storage, "abc", &[1.0], &["only"]);

        promote(config.clone(), "run_id=abc".to_string()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(config.storage.pointer_file()).unwrap(),
            "abc"
        );

        assert!(promote(config.clone(), "missing".to_string()).await.is_err());
        assert_eq!(
            std::fs::read_to_string(config.storage.pointer_file()).unwrap(),
            "abc"
        );
    }
}
