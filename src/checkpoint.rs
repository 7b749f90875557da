//! Checkpointing of the trained network
//!
//! A checkpoint is a directory holding the Burn model record (`model.mpk`)
//! and `metadata.json`. Writes go to a temp directory first and are renamed
//! into place. Training only writes checkpoints; the readers are built for
//! tests only.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::network::ActorCritic;

/// Training metadata saved alongside model weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Index of the last episode trained
    pub episode: usize,
    /// Trailing average episode reward at save time
    pub average_reward: f32,
    /// Whether the reward threshold was reached
    pub solved: bool,
    pub env_name: String,
    pub seed: u64,
    /// Network shape, needed to rebuild the model before loading weights
    pub obs_dim: usize,
    pub action_count: usize,
    pub hidden_size: usize,
}

/// Save `model` and `metadata` as `checkpoints/<name>` under `run_dir`
///
/// Returns the path to the saved checkpoint directory
pub fn save<B: Backend>(
    run_dir: &Path,
    name: &str,
    model: &ActorCritic<B>,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf> {
    let checkpoints_dir = run_dir.join("checkpoints");
    let checkpoint_dir = checkpoints_dir.join(name);

    // Create temp directory for atomic write
    let temp_dir = checkpoints_dir.join(format!(".tmp_{name}"));
    if temp_dir.exists() {
        fs::remove_dir_all(&temp_dir)?;
    }
    fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed to create checkpoint dir: {:?}", temp_dir))?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(temp_dir.join("model"), &recorder)
        .context("Failed to save model")?;

    let metadata_json = serde_json::to_string_pretty(metadata)?;
    fs::write(temp_dir.join("metadata.json"), metadata_json)?;

    // Atomic rename
    if checkpoint_dir.exists() {
        fs::remove_dir_all(&checkpoint_dir)?;
    }
    fs::rename(&temp_dir, &checkpoint_dir)?;

    Ok(checkpoint_dir)
}

/// Read only the metadata of a checkpoint
#[cfg(test)]
pub fn load_metadata(checkpoint_dir: &Path) -> Result<CheckpointMetadata> {
    let metadata_path = checkpoint_dir.join("metadata.json");
    let metadata_json =
        fs::read_to_string(&metadata_path).context("Failed to read checkpoint metadata")?;
    serde_json::from_str(&metadata_json).context("Failed to parse checkpoint metadata")
}

/// Load a checkpoint, rebuilding the network from the recorded shape
#[cfg(test)]
pub fn load<B: Backend>(
    checkpoint_dir: &Path,
    device: &B::Device,
) -> Result<(ActorCritic<B>, CheckpointMetadata)> {
    let metadata = load_metadata(checkpoint_dir)?;

    let default_model: ActorCritic<B> = ActorCritic::with_hidden_size(
        metadata.obs_dim,
        metadata.action_count,
        metadata.hidden_size,
        device,
    );

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let model = default_model
        .load_file(checkpoint_dir.join("model"), &recorder, device)
        .context("Failed to load model")?;

    Ok((model, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    fn metadata() -> CheckpointMetadata {
        CheckpointMetadata {
            episode: 321,
            average_reward: 201.5,
            solved: true,
            env_name: "cartpole".to_string(),
            seed: 42,
            obs_dim: 4,
            action_count: 2,
            hidden_size: 16,
        }
    }

    #[test]
    fn test_save_creates_files() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let model: ActorCritic<TestBackend> = ActorCritic::with_hidden_size(4, 2, 16, &device);

        let path = save(dir.path(), "final", &model, &metadata()).unwrap();

        assert_eq!(path, dir.path().join("checkpoints").join("final"));
        assert!(path.join("model.mpk").exists());
        assert!(path.join("metadata.json").exists());
        assert!(!dir.path().join("checkpoints").join(".tmp_final").exists());
        assert_eq!(load_metadata(&path).unwrap(), metadata());
    }

    #[test]
    fn test_loaded_model_matches_saved() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let model: ActorCritic<TestBackend> = ActorCritic::with_hidden_size(4, 2, 16, &device);
        let path = save(dir.path(), "final", &model, &metadata()).unwrap();

        let (loaded, meta) = load::<TestBackend>(&path, &device).unwrap();
        assert_eq!(meta.episode, 321);

        let obs = Tensor::<TestBackend, 2>::from_floats([[0.1, -0.2, 0.03, 0.4]], &device);
        let (logits_a, value_a) = model.forward(obs.clone());
        let (logits_b, value_b) = loaded.forward(obs);

        let a: Vec<f32> = logits_a.into_data().to_vec().unwrap();
        let b: Vec<f32> = logits_b.into_data().to_vec().unwrap();
        assert_eq!(a, b);
        let va: f32 = value_a.into_scalar();
        let vb: f32 = value_b.into_scalar();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_overwrites_existing_checkpoint() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let model: ActorCritic<TestBackend> = ActorCritic::with_hidden_size(4, 2, 16, &device);

        save(dir.path(), "final", &model, &metadata()).unwrap();
        let updated = CheckpointMetadata {
            episode: 400,
            ..metadata()
        };
        let path = save(dir.path(), "final", &model, &updated).unwrap();

        assert_eq!(load_metadata(&path).unwrap().episode, 400);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_metadata(&dir.path().join("nope")).is_err());
    }
}
