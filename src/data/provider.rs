// ============================================================
// Layer 3 — Digit Data Provider
// ============================================================
// Loads the MNIST training split through Burn's vision dataset
// (downloaded and cached by burn-dataset on first use), flattens
// each 28×28 image into a 784-value row scaled to [0, 1], and
// validates the result before any training starts.
//
// The output class count is derived from the data itself
// (max label + 1), not hardcoded — the model layer never needs
// to know it is looking at digits.

use anyhow::{bail, Result};
use burn::data::dataset::{vision::MnistDataset, Dataset};

use crate::data::dataset::DigitSample;

/// Load and flatten the MNIST training images.
pub fn load_digits() -> Result<Vec<DigitSample>> {
    let dataset = MnistDataset::train();

    let mut samples = Vec::with_capacity(dataset.len());
    for item in dataset.iter() {
        let mut pixels = Vec::with_capacity(28 * 28);
        for row in item.image.iter() {
            for &value in row.iter() {
                // Raw values are 0..=255; the model expects [0, 1]
                pixels.push(value / 255.0);
            }
        }
        samples.push(DigitSample {
            pixels,
            label: item.label as i64,
        });
    }

    tracing::info!("Loaded {} digit images", samples.len());
    Ok(samples)
}

/// Fail-fast structural validation, run once before training.
///
/// Returns `(input_size, n_classes)` on success. Any shape or label
/// problem aborts the run here with a descriptive error instead of
/// surfacing later as a tensor shape panic mid-epoch.
pub fn validate_samples(samples: &[DigitSample]) -> Result<(usize, usize)> {
    let Some(first) = samples.first() else {
        bail!("Dataset is empty; nothing to train on");
    };

    let input_size = first.pixels.len();
    if input_size == 0 {
        bail!("Samples have zero features");
    }

    let mut max_label = 0i64;
    for (index, sample) in samples.iter().enumerate() {
        if sample.pixels.len() != input_size {
            bail!(
                "Sample {} has {} features, expected {} (malformed dataset)",
                index,
                sample.pixels.len(),
                input_size,
            );
        }
        if sample.label < 0 {
            bail!("Sample {} has negative label {}", index, sample.label);
        }
        max_label = max_label.max(sample.label);
    }

    Ok((input_size, (max_label + 1) as usize))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dim: usize, label: i64) -> DigitSample {
        DigitSample {
            pixels: vec![0.5; dim],
            label,
        }
    }

    #[test]
    fn valid_samples_report_dimensions_and_classes() {
        let samples = vec![sample(4, 0), sample(4, 2), sample(4, 1)];
        let (input_size, n_classes) = validate_samples(&samples).unwrap();
        assert_eq!(input_size, 4);
        // max label is 2, so classes 0..=2
        assert_eq!(n_classes, 3);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(validate_samples(&[]).is_err());
    }

    #[test]
    fn ragged_features_are_rejected() {
        let samples = vec![sample(4, 0), sample(3, 1)];
        let err = validate_samples(&samples).unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn negative_labels_are_rejected() {
        let samples = vec![sample(4, 0), sample(4, -1)];
        assert!(validate_samples(&samples).is_err());
    }
}
