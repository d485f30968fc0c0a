// ============================================================
// Layer 5 — Metrics
// ============================================================
// Two small pieces:
//   LossMeter     — accumulates per-batch losses, weighted by batch
//                   size, into an epoch mean. The last batch of an
//                   epoch is usually short, so an unweighted mean of
//                   batch means would skew the result.
//   MetricsLogger — appends one CSV row per epoch so learning curves
//                   can be plotted after the run.
//
// Example CSV output:
//   epoch,train_loss,valid_loss,valid_acc
//   0,0.524513,0.312022,0.911300
//   1,0.287401,0.254180,0.927800

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

// ─── LossMeter ────────────────────────────────────────────────────────────────
/// Batch-size-weighted loss accumulator for one phase of one epoch.
#[derive(Debug, Default)]
pub struct LossMeter {
    weighted_sum: f64,
    count:        usize,
}

impl LossMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch: `mean_loss` over `batch_size` samples.
    pub fn add(&mut self, mean_loss: f64, batch_size: usize) {
        self.weighted_sum += mean_loss * batch_size as f64;
        self.count += batch_size;
    }

    /// Per-sample mean over everything recorded so far.
    /// NaN when nothing was recorded (e.g. an empty partition).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.weighted_sum / self.count as f64
        }
    }
}

// ─── Epoch metrics ────────────────────────────────────────────────────────────
/// One row of metrics data for a single training epoch (0-indexed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub valid_loss: f64,
    pub valid_acc:  f64,
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger writing `metrics.csv` inside `dir`.
    /// Writes the CSV header only if the file is new, so repeated
    /// runs append instead of overwriting history.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,valid_loss,valid_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new CSV row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.valid_loss, m.valid_acc,
        )?;

        Ok(())
    }
}
