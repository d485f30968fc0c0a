// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap, validates flag ranges before
// any computation starts, and hands a TrainConfig to Layer 2.
// The application layer never sees clap types.
//
// Flag spellings use underscores (--model_fn, --gpu_id, ...) to
// match the tool's documented interface, so each arg carries an
// explicit `long` name instead of clap's kebab-case default.

use anyhow::{bail, Result};
use clap::Parser;

use crate::application::train_use_case::{TrainConfig, TrainUseCase};

// The default device depends on how the binary was built: GPU 0
// when a GPU backend is compiled in, otherwise CPU.
#[cfg(feature = "wgpu")]
const DEFAULT_GPU_ID: i32 = 0;
#[cfg(not(feature = "wgpu"))]
const DEFAULT_GPU_ID: i32 = -1;

#[derive(Parser, Debug)]
#[command(
    name = "mnist-classifier",
    version,
    about = "Train a feed-forward digit classifier on MNIST and save the best checkpoint."
)]
pub struct Cli {
    /// Output path for the trained model artifact
    #[arg(long = "model_fn")]
    pub model_fn: String,

    /// Compute device index; negative values select the CPU
    #[arg(long = "gpu_id", default_value_t = DEFAULT_GPU_ID, allow_hyphen_values = true)]
    pub gpu_id: i32,

    /// Fraction of samples used for training; the rest validate
    #[arg(long = "train_ratio", default_value_t = 0.8)]
    pub train_ratio: f64,

    /// Number of samples processed together in one forward pass
    #[arg(long = "batch_size", default_value_t = 256)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long = "n_epochs", default_value_t = 5)]
    pub n_epochs: usize,

    /// Linear layer count, including the output projection
    #[arg(long = "n_layers", default_value_t = 5)]
    pub n_layers: usize,

    /// Use dropout between layers instead of batch normalization
    #[arg(long = "use_dropout")]
    pub use_dropout: bool,

    /// Dropout probability, only used with --use_dropout
    #[arg(long = "dropout_p", default_value_t = 0.3)]
    pub dropout_p: f64,

    /// 0 = silent, 1 or higher = per-epoch progress lines
    #[arg(long = "verbose", default_value_t = 1)]
    pub verbose: u32,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        self.validate()?;

        let config: TrainConfig = self.into();
        let verbose  = config.verbose;
        let model_fn = config.model_fn.clone();

        let report = TrainUseCase::new(config).execute()?;

        if verbose >= 1 {
            match (report.best_epoch, report.best_valid_loss) {
                (Some(epoch), Some(loss)) => println!(
                    "Training complete. Best epoch: {} (valid_loss={:.4e}). Saved to '{}'.",
                    epoch + 1,
                    loss,
                    model_fn,
                ),
                _ => println!(
                    "Training complete (no validation improvement recorded). Saved to '{}'.",
                    model_fn,
                ),
            }
        }
        Ok(())
    }

    /// Range checks that must fail before any data is downloaded
    /// or any tensor is allocated.
    fn validate(&self) -> Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            bail!("--train_ratio must be inside (0, 1), got {}", self.train_ratio);
        }
        if self.batch_size == 0 {
            bail!("--batch_size must be at least 1");
        }
        if self.n_layers == 0 {
            bail!("--n_layers must be at least 1");
        }
        if !(0.0..1.0).contains(&self.dropout_p) {
            bail!("--dropout_p must be inside [0, 1), got {}", self.dropout_p);
        }
        if self.n_epochs == 0 {
            tracing::warn!("--n_epochs is 0; the untrained initial model will be saved as-is");
        }
        Ok(())
    }
}

impl From<Cli> for TrainConfig {
    fn from(a: Cli) -> Self {
        TrainConfig {
            model_fn:    a.model_fn,
            gpu_id:      a.gpu_id,
            train_ratio: a.train_ratio,
            batch_size:  a.batch_size,
            n_epochs:    a.n_epochs,
            n_layers:    a.n_layers,
            use_dropout: a.use_dropout,
            dropout_p:   a.dropout_p,
            verbose:     a.verbose,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(
            std::iter::once("mnist-classifier").chain(args.iter().copied()),
        )
    }

    #[test]
    fn defaults_match_the_documented_interface() {
        let c = cli(&["--model_fn", "out.mpk"]);
        assert_eq!(c.train_ratio, 0.8);
        assert_eq!(c.batch_size, 256);
        assert_eq!(c.n_epochs, 5);
        assert_eq!(c.n_layers, 5);
        assert!(!c.use_dropout);
        assert_eq!(c.dropout_p, 0.3);
        assert_eq!(c.verbose, 1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn model_fn_is_required() {
        let result = Cli::try_parse_from(["mnist-classifier"]);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_ratio_fails_fast() {
        assert!(cli(&["--model_fn", "m", "--train_ratio", "1.0"]).validate().is_err());
        assert!(cli(&["--model_fn", "m", "--train_ratio", "0.0"]).validate().is_err());
        assert!(cli(&["--model_fn", "m", "--train_ratio", "0.5"]).validate().is_ok());
    }

    #[test]
    fn degenerate_sizes_fail_fast() {
        assert!(cli(&["--model_fn", "m", "--batch_size", "0"]).validate().is_err());
        assert!(cli(&["--model_fn", "m", "--n_layers", "0"]).validate().is_err());
        assert!(cli(&["--model_fn", "m", "--dropout_p", "1.0"]).validate().is_err());
    }

    #[test]
    fn negative_gpu_id_parses_as_cpu_request() {
        let c = cli(&["--model_fn", "m", "--gpu_id", "-1"]);
        assert_eq!(c.gpu_id, -1);
    }

    #[test]
    fn conversion_preserves_every_flag() {
        let c = cli(&[
            "--model_fn", "out.mpk",
            "--gpu_id", "-1",
            "--train_ratio", "0.7",
            "--batch_size", "64",
            "--n_epochs", "3",
            "--n_layers", "4",
            "--use_dropout",
            "--dropout_p", "0.2",
            "--verbose", "0",
        ]);
        let cfg: TrainConfig = c.into();
        assert_eq!(cfg.model_fn, "out.mpk");
        assert_eq!(cfg.train_ratio, 0.7);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.n_epochs, 3);
        assert_eq!(cfg.n_layers, 4);
        assert!(cfg.use_dropout);
        assert_eq!(cfg.dropout_p, 0.2);
        assert_eq!(cfg.verbose, 0);
    }
}
