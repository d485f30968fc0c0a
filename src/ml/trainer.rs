// ============================================================
// Layer 4 — Training Loop
// ============================================================
// Epoch-based optimization with per-epoch validation and
// best-state tracking, using Burn's DataLoader and Adam.
//
// Backend notes:
//   - Training runs on an autodiff backend for gradients
//   - model.valid() returns the model on the inner backend, which
//     disables dropout and gradient tracking for validation
//   - The validation loader therefore batches on the inner backend
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{Context, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::DigitBatcher, dataset::DigitDataset};
use crate::infra::artifact::{ArtifactStore, TrainedArtifact};
use crate::infra::metrics::{EpochMetrics, LossMeter, MetricsLogger};
use crate::ml::loss::nll_loss;
use crate::ml::model::{ClassifierConfig, ImageClassifier};
use crate::ml::tracker::BestTracker;

/// Adam's default step size; not exposed as a flag.
const LEARNING_RATE: f64 = 1e-3;

/// Seed for the training loader's per-epoch reshuffle.
const SHUFFLE_SEED: u64 = 42;

#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Map the `--gpu_id` flag to a concrete device. Negative ids select
/// the CPU; non-negative ids select the discrete GPU with that index.
#[cfg(feature = "wgpu")]
pub fn select_device(gpu_id: i32) -> burn::backend::wgpu::WgpuDevice {
    use burn::backend::wgpu::WgpuDevice;

    if gpu_id < 0 {
        WgpuDevice::Cpu
    } else {
        WgpuDevice::DiscreteGpu(gpu_id as usize)
    }
}

#[cfg(not(feature = "wgpu"))]
pub fn select_device(gpu_id: i32) -> burn::backend::ndarray::NdArrayDevice {
    if gpu_id >= 0 {
        tracing::warn!(
            "gpu_id {} requested but this build has no GPU backend; using the CPU",
            gpu_id,
        );
    }
    burn::backend::ndarray::NdArrayDevice::Cpu
}

/// What a finished run looked like, for callers and for tests.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs_run:       usize,
    pub optimizer_steps:  usize,
    pub final_train_loss: f64,
    pub final_valid_loss: f64,
    pub best_epoch:       Option<usize>,
    pub best_valid_loss:  Option<f64>,
}

/// Train on the compiled-in backend and persist the best state.
pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     ClassifierConfig,
    train_dataset: DigitDataset,
    valid_dataset: DigitDataset,
    store:         &ArtifactStore,
) -> Result<TrainingReport> {
    let device = select_device(cfg.gpu_id);
    tracing::info!("Using device: {:?}", device);

    let metrics_dir = match Path::new(&cfg.model_fn).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let metrics = MetricsLogger::new(&metrics_dir)?;

    let (model, optim, report) = train_loop::<TrainBackend>(
        cfg,
        &model_cfg,
        train_dataset,
        valid_dataset,
        device,
        Some(&metrics),
    )?;

    // Serialize model and optimizer records to bytes so everything
    // lands in one artifact file.
    let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
    let model_bytes = recorder
        .record(model.into_record(), ())
        .context("Failed to serialize model parameters")?;
    let optim_bytes = recorder
        .record(optim.to_record(), ())
        .context("Failed to serialize optimizer state")?;

    store.save(&TrainedArtifact {
        model:        model_bytes,
        optim:        optim_bytes,
        model_config: model_cfg,
        train_config: cfg.clone(),
    })?;

    Ok(report)
}

/// The epoch state machine. Returns the model with the best-epoch
/// parameters restored, the optimizer, and a report of the run.
///
/// Two documented edge cases:
///   - empty validation set: every epoch's validation loss is NaN,
///     the tracker never fires, and the final training state is kept;
///   - n_epochs = 0: no optimizer step runs and the freshly
///     initialized model passes through unchanged.
pub(crate) fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    model_cfg:     &ClassifierConfig,
    train_dataset: DigitDataset,
    valid_dataset: DigitDataset,
    device:        B::Device,
    metrics:       Option<&MetricsLogger>,
) -> Result<(ImageClassifier<B>, impl Optimizer<ImageClassifier<B>, B>, TrainingReport)> {
    let mut model: ImageClassifier<B> = model_cfg.init(&device);
    let mut optim = AdamConfig::new().init();

    tracing::info!("Model initialized ({} parameters)", model.num_params());
    if cfg.verbose >= 1 {
        println!("{model}");
    }

    // Training batches are reshuffled by the loader every epoch;
    // validation keeps a fixed order so runs are comparable.
    let train_loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(SHUFFLE_SEED)
        .num_workers(1)
        .build(train_dataset);

    let valid_loader = DataLoaderBuilder::new(DigitBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(valid_dataset);

    let mut tracker: BestTracker<_> = BestTracker::new();
    let mut optimizer_steps  = 0usize;
    let mut final_train_loss = f64::NAN;
    let mut final_valid_loss = f64::NAN;

    for epoch in 0..cfg.n_epochs {
        // ── Train phase ───────────────────────────────────────────────────────
        let mut train_meter = LossMeter::new();

        for batch in train_loader.iter() {
            let batch_size = batch.labels.dims()[0];

            let log_probs = model.forward(batch.pixels);
            let loss = nll_loss(log_probs, batch.labels);
            train_meter.add(loss.clone().into_scalar().elem::<f64>(), batch_size);

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(LEARNING_RATE, model, grads);
            optimizer_steps += 1;
        }

        let train_loss = train_meter.mean();

        // ── Validation phase ──────────────────────────────────────────────────
        // Inner-backend model: no gradient tracking, dropout inactive,
        // batch norm in inference mode. No parameter updates here.
        let model_valid = model.valid();

        let mut valid_meter = LossMeter::new();
        let mut correct = 0usize;
        let mut total   = 0usize;

        for batch in valid_loader.iter() {
            let batch_size = batch.labels.dims()[0];

            let log_probs = model_valid.forward(batch.pixels);
            let loss = nll_loss(log_probs.clone(), batch.labels.clone());
            valid_meter.add(loss.into_scalar().elem::<f64>(), batch_size);

            let predicted = log_probs.argmax(1).flatten::<1>(0, 1);
            let hits: i64 = predicted
                .equal(batch.labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            correct += hits as usize;
            total   += batch_size;
        }

        let valid_loss = valid_meter.mean();
        let valid_acc  = if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        };

        // ── Best tracking ─────────────────────────────────────────────────────
        // Strictly-lower validation loss replaces the retained snapshot;
        // the record is a deep copy, immune to later optimizer steps.
        let improved = tracker.observe(epoch, valid_loss, || model.clone().into_record());
        if improved {
            tracing::debug!("Epoch {} is the new best (valid_loss={:.4e})", epoch, valid_loss);
        }

        if cfg.verbose >= 1 {
            println!(
                "Epoch({}/{}): train_loss={:.4e} valid_loss={:.4e} lowest_loss={:.4e}",
                epoch + 1,
                cfg.n_epochs,
                train_loss,
                valid_loss,
                tracker.lowest_loss(),
            );
        }

        if let Some(logger) = metrics {
            logger.log(&EpochMetrics {
                epoch,
                train_loss,
                valid_loss,
                valid_acc,
            })?;
        }

        final_train_loss = train_loss;
        final_valid_loss = valid_loss;
    }

    let best_epoch      = tracker.best_epoch();
    let best_valid_loss = best_epoch.map(|_| tracker.lowest_loss());

    // Reload the retained best snapshot so the returned model reflects
    // the best validation epoch, not necessarily the last one.
    if let Some(best) = tracker.into_best() {
        model = model.load_record(best.snapshot);
        tracing::info!(
            "Restored best parameters from epoch {} (valid_loss={:.4e})",
            best.epoch,
            best.loss,
        );
    } else if cfg.n_epochs > 0 {
        tracing::warn!("No validation improvement was recorded; keeping the final training state");
    }

    let report = TrainingReport {
        epochs_run: cfg.n_epochs,
        optimizer_steps,
        final_train_loss,
        final_valid_loss,
        best_epoch,
        best_valid_loss,
    };

    Ok((model, optim, report))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::DigitSample;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn synthetic_samples(n: usize) -> Vec<DigitSample> {
        (0..n)
            .map(|i| {
                let label = (i % 3) as i64;
                let mut pixels = vec![0.1; 6];
                pixels[label as usize] = 1.0;
                DigitSample { pixels, label }
            })
            .collect()
    }

    fn test_config(n_epochs: usize, batch_size: usize) -> TrainConfig {
        TrainConfig {
            model_fn: "unused".into(),
            gpu_id: -1,
            train_ratio: 0.8,
            batch_size,
            n_epochs,
            n_layers: 2,
            use_dropout: false,
            dropout_p: 0.3,
            verbose: 0,
        }
    }

    fn run(cfg: &TrainConfig, train: Vec<DigitSample>, valid: Vec<DigitSample>) -> TrainingReport {
        let model_cfg = ClassifierConfig::new(6, 3).with_n_layers(cfg.n_layers);
        let (_model, _optim, report) = train_loop::<TestBackend>(
            cfg,
            &model_cfg,
            DigitDataset::new(train),
            DigitDataset::new(valid),
            Default::default(),
            None,
        )
        .unwrap();
        report
    }

    #[test]
    fn one_covering_batch_takes_exactly_one_step() {
        let cfg = test_config(1, 9);
        let report = run(&cfg, synthetic_samples(9), synthetic_samples(3));

        assert_eq!(report.optimizer_steps, 1);
        assert_eq!(report.epochs_run, 1);
        assert!(report.final_train_loss.is_finite());
    }

    #[test]
    fn step_count_is_epochs_times_batches() {
        let cfg = test_config(2, 4);
        let report = run(&cfg, synthetic_samples(10), synthetic_samples(3));

        // ceil(10 / 4) = 3 batches per epoch, 2 epochs
        assert_eq!(report.optimizer_steps, 6);
    }

    #[test]
    fn zero_epochs_passes_initial_state_through() {
        let cfg = test_config(0, 4);
        let report = run(&cfg, synthetic_samples(8), synthetic_samples(4));

        assert_eq!(report.optimizer_steps, 0);
        assert_eq!(report.epochs_run, 0);
        assert!(report.best_epoch.is_none());
        assert!(report.final_train_loss.is_nan());
    }

    #[test]
    fn empty_validation_set_never_records_a_best_epoch() {
        let cfg = test_config(2, 4);
        let report = run(&cfg, synthetic_samples(8), Vec::new());

        assert!(report.optimizer_steps > 0);
        assert!(report.best_epoch.is_none());
        assert!(report.final_valid_loss.is_nan());
    }

    #[test]
    fn training_with_validation_records_a_best_epoch() {
        let cfg = test_config(2, 4);
        let report = run(&cfg, synthetic_samples(12), synthetic_samples(6));

        assert!(report.best_epoch.is_some());
        assert!(report.best_valid_loss.unwrap().is_finite());
    }
}
