// ============================================================
// Layer 3 — Digit Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<DigitSample>
// into device-ready tensors.
//
// How batching works here:
//   Input:  Vec of N DigitSamples, each with D pixel values
//   Output: DigitBatch with a [N, D] float tensor and a [N] label tensor
//
//   We flatten all pixel rows into one long Vec, then reshape:
//   [s1_p1, ..., s1_pD, s2_p1, ..., sN_pD] → [N, D]
//
// All samples already have the same dimensionality — the provider
// validates this before training starts, so no padding is needed.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::DigitSample;

// ─── DigitBatch ───────────────────────────────────────────────────────────────
/// A batch of digit samples ready for the model forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Wgpu) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Flattened pixel rows — shape: [batch_size, input_dim]
    pub pixels: Tensor<B, 2>,

    /// Ground truth class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── DigitBatcher ─────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created where the model lives, never on an ambient default.
#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

// The DataLoader calls .batch(items) with each mini-batch of samples;
// every batch has the configured size except possibly the last one.
impl<B: Backend> Batcher<DigitSample, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<DigitSample>) -> DigitBatch<B> {
        let batch_size = items.len();
        // Uniform dimensionality is validated at load time
        let input_dim  = items[0].pixels.len();

        let pixels_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();

        let labels_flat: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let pixels = Tensor::<B, 1>::from_floats(
            pixels_flat.as_slice(), &self.device
        ).reshape([batch_size, input_dim]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            labels_flat.as_slice(), &self.device
        );

        DigitBatch { pixels, labels }
    }
}
