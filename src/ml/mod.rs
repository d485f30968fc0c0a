// ============================================================
// Layer 4 — ML Layer (Burn)
// ============================================================
// All model math lives here:
//
//   model.rs   — the configurable-depth feed-forward classifier:
//                Linear → LeakyReLU → (BatchNorm | Dropout) blocks
//                with a log_softmax head
//
//   loss.rs    — negative log-likelihood over log-probabilities
//
//   trainer.rs — the epoch loop: forward, loss, backward, Adam
//                step, per-epoch validation, artifact saving
//
//   tracker.rs — retains a deep-copy parameter snapshot at the
//                lowest validation loss seen so far
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Feed-forward digit classifier architecture
pub mod model;

/// Negative log-likelihood loss
pub mod loss;

/// Full training loop with validation and best-state tracking
pub mod trainer;

/// Best-validation-loss snapshot tracker
pub mod tracker;
