// ============================================================
// Layer 3 — Data Pipeline
// ============================================================
// Everything from raw MNIST images to device-ready tensor batches.
//
// The pipeline flows in this order:
//
//   MNIST images
//       │
//       ▼
//   provider          → downloads, flattens, normalizes, validates
//       │
//       ▼
//   splitter          → shuffles and splits into train/validation
//       │
//       ▼
//   DigitDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   DigitBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.

/// Loads, flattens and validates the MNIST training images
pub mod provider;

/// Implements Burn's Dataset trait for digit samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
