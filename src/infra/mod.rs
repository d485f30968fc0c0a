// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   artifact.rs — the single-file training artifact: best model
//                 parameters, optimizer state, and configuration,
//                 written atomically via temp-then-rename
//
//   metrics.rs  — epoch loss accumulation and the per-epoch CSV
//                 metrics log for plotting learning curves
//
// Reference: Burn Book §5 (Checkpointing)

/// Single-file training artifact saving and loading
pub mod artifact;

/// Loss accumulation and training metrics CSV logger
pub mod metrics;
