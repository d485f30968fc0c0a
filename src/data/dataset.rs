use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One flattened digit image with its class label.
/// Pixels are row-major 28×28 grayscale values scaled to [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitSample {
    pub pixels: Vec<f32>,
    pub label:  i64,
}

/// In-memory dataset over one partition (train or validation).
pub struct DigitDataset {
    samples: Vec<DigitSample>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitSample>) -> Self {
        Self { samples }
    }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
