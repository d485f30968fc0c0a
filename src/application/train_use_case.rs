// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load MNIST images            (Layer 3 - data)
//   Step 2: Validate shapes and labels   (Layer 3 - data)
//   Step 3: Split train/validation       (Layer 3 - data)
//   Step 4: Build datasets               (Layer 3 - data)
//   Step 5: Run training loop            (Layer 4 - ml)
//   Step 6: Persist the best state       (Layer 5 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::DigitDataset,
    provider::{load_digits, validate_samples},
    splitter::split_train_valid,
};
use crate::infra::artifact::ArtifactStore;
use crate::ml::model::ClassifierConfig;
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Immutable after parsing,
// and persisted verbatim inside the artifact. serde handles the
// JSON/MessagePack round trips automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub model_fn:    String,
    pub gpu_id:      i32,
    pub train_ratio: f64,
    pub batch_size:  usize,
    pub n_epochs:    usize,
    pub n_layers:    usize,
    pub use_dropout: bool,
    pub dropout_p:   f64,
    pub verbose:     u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_fn:    "model.mpk".to_string(),
            gpu_id:      -1,
            train_ratio: 0.8,
            batch_size:  256,
            n_epochs:    5,
            n_layers:    5,
            use_dropout: false,
            dropout_p:   0.3,
            verbose:     1,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg = &self.config;

        // ── Step 1: Load the digit images ─────────────────────────────────────
        tracing::info!("Loading MNIST training images");
        let samples = load_digits()?;

        // ── Step 2: Fail fast on malformed data ───────────────────────────────
        // The output size is derived from the labels, the input size
        // from the pixel rows, before any tensor is allocated.
        let (input_size, n_classes) = validate_samples(&samples)?;
        tracing::info!(
            "{} samples, {} features, {} classes",
            samples.len(),
            input_size,
            n_classes,
        );

        // ── Step 3: Train / validation split ──────────────────────────────────
        let (train_samples, valid_samples) = split_train_valid(samples, cfg.train_ratio);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            valid_samples.len(),
        );

        if train_samples.is_empty() {
            bail!(
                "Training partition is empty (train_ratio={} over {} samples)",
                cfg.train_ratio,
                valid_samples.len(),
            );
        }
        if valid_samples.is_empty() {
            tracing::warn!(
                "Validation partition is empty; best-state tracking will never fire \
                 and the final training state will be saved as-is",
            );
        }

        // ── Step 4: Build Burn datasets ───────────────────────────────────────
        let train_dataset = DigitDataset::new(train_samples);
        let valid_dataset = DigitDataset::new(valid_samples);

        let model_cfg = ClassifierConfig::new(input_size, n_classes)
            .with_n_layers(cfg.n_layers)
            .with_use_dropout(cfg.use_dropout)
            .with_dropout_p(cfg.dropout_p);

        // ── Step 5 + 6: Train, then persist the best state ────────────────────
        let store = ArtifactStore::new(cfg.model_fn.clone());
        run_training(cfg, model_cfg, train_dataset, valid_dataset, &store)
    }
}
