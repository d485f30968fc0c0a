// ============================================================
// Layer 5 — Artifact Store
// ============================================================
// Persists one training run as a single file with three named
// fields: model parameters, optimizer state, and the full
// configuration record.
//
// Format: MessagePack (named fields) around Burn byte records —
// the same format family Burn's own CompactRecorder uses, but in
// one self-contained file instead of a directory of checkpoints.
//
// The resolved model architecture (layer count plus the data-derived
// input/output sizes) is stored explicitly, so inference can rebuild
// the exact network without re-deriving anything from the dataset.
//
// The write is atomic from the caller's perspective: bytes go to a
// temporary sibling path first and are renamed into place, so the
// artifact either exists completely or not at all.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{ClassifierConfig, ImageClassifier, ImageClassifierRecord};

/// Everything a finished run leaves behind.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedArtifact {
    /// Best-epoch model parameters, as Burn record bytes
    pub model: Vec<u8>,

    /// Adam's internal state (moment estimates), as Burn record bytes
    pub optim: Vec<u8>,

    /// The resolved architecture the parameter record fits
    pub model_config: ClassifierConfig,

    /// The run configuration, persisted verbatim
    pub train_config: TrainConfig,
}

impl TrainedArtifact {
    /// Rebuild the trained model: initialize the architecture from the
    /// stored config, then load the recorded parameters into it.
    pub fn restore_model<B: Backend>(&self, device: &B::Device) -> Result<ImageClassifier<B>> {
        let record: ImageClassifierRecord<B> = BinBytesRecorder::<FullPrecisionSettings>::default()
            .load(self.model.clone(), device)
            .context("Cannot decode model parameters from the artifact")?;

        Ok(self.model_config.init::<B>(device).load_record(record))
    }
}

/// Saves and loads the training artifact at a fixed path.
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the artifact, atomically, plus a human-readable
    /// `<path>.json` sidecar with the run configuration.
    pub fn save(&self, artifact: &TrainedArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Cannot create output directory '{}'", parent.display())
                })?;
            }
        }

        let bytes = rmp_serde::to_vec_named(artifact).context("Failed to encode artifact")?;

        // Temp-then-rename so a crash mid-write never leaves a
        // half-written artifact at the final path.
        let tmp_path = PathBuf::from(format!("{}.tmp", self.path.display()));
        fs::write(&tmp_path, &bytes)
            .with_context(|| format!("Failed to write '{}'", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move artifact into '{}'", self.path.display()))?;

        let sidecar = PathBuf::from(format!("{}.json", self.path.display()));
        fs::write(&sidecar, serde_json::to_string_pretty(&artifact.train_config)?)
            .with_context(|| format!("Cannot write config sidecar '{}'", sidecar.display()))?;

        tracing::info!("Saved artifact to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<TrainedArtifact> {
        let bytes = fs::read(&self.path).with_context(|| {
            format!(
                "Cannot read artifact '{}'. Have you trained the model first?",
                self.path.display(),
            )
        })?;

        rmp_serde::from_slice(&bytes).context("Artifact is corrupt or from an incompatible build")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn temp_artifact_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("digit_artifact_{}_{}.bin", tag, std::process::id()))
    }

    fn make_artifact(model_cfg: &ClassifierConfig, model: &ImageClassifier<TestBackend>) -> TrainedArtifact {
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        TrainedArtifact {
            model:        recorder.record(model.clone().into_record(), ()).unwrap(),
            optim:        Vec::new(),
            model_config: model_cfg.clone(),
            train_config: TrainConfig::default(),
        }
    }

    #[test]
    fn round_trip_restores_identical_inference() {
        let device = Default::default();
        let model_cfg = ClassifierConfig::new(4, 3).with_n_layers(2);
        let model = model_cfg.init::<TestBackend>(&device);

        let path  = temp_artifact_path("roundtrip");
        let store = ArtifactStore::new(&path);
        store.save(&make_artifact(&model_cfg, &model)).unwrap();

        let restored = store
            .load()
            .unwrap()
            .restore_model::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.9, 0.3, 0.7], [0.5, 0.5, 0.0, 1.0]],
            &device,
        );
        let before = model.forward(input.clone());
        let after  = restored.forward(input);
        before.to_data().assert_approx_eq(&after.to_data(), 5);

        fs::remove_file(&path).unwrap();
        let _ = fs::remove_file(format!("{}.json", path.display()));
    }

    #[test]
    fn save_leaves_no_temporary_file_behind() {
        let device = Default::default();
        let model_cfg = ClassifierConfig::new(4, 2).with_n_layers(1);
        let model = model_cfg.init::<TestBackend>(&device);

        let path  = temp_artifact_path("atomic");
        let store = ArtifactStore::new(&path);
        store.save(&make_artifact(&model_cfg, &model)).unwrap();

        assert!(path.exists());
        assert!(!PathBuf::from(format!("{}.tmp", path.display())).exists());
        assert!(PathBuf::from(format!("{}.json", path.display())).exists());

        fs::remove_file(&path).unwrap();
        let _ = fs::remove_file(format!("{}.json", path.display()));
    }

    #[test]
    fn loading_a_missing_artifact_explains_itself() {
        let store = ArtifactStore::new(temp_artifact_path("missing"));
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("trained the model"));
    }
}
