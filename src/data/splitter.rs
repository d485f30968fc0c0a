// ============================================================
// Layer 3 — Train/Validation Splitter
// ============================================================
// Randomly shuffles samples and splits them into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure performance on unseen data
//
// Why shuffle before splitting?
//   MNIST is stored in file order. Without shuffling, the
//   validation set could be dominated by whatever happens to
//   come last. Shuffling gives both sets a representative mix.
//
// The split is NOT stratified by class and takes no seed —
// that matches the behavior this tool ships with; do not add
// stratification here without changing the documented contract.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom,
// the standard unbiased shuffle algorithm.

use rand::seq::SliceRandom;

/// Randomly shuffle `samples` and split into (train, validation).
///
/// `|train| == round(train_ratio * N)` and the two halves together
/// contain every input sample exactly once.
pub fn split_train_valid<T>(mut samples: Vec<T>, train_ratio: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();

    samples.shuffle(&mut rng);

    // e.g. 100 samples * 0.8 = 80 → first 80 are training.
    // round() so a ratio of 0.5 over 5 samples gives 3 (half away from zero).
    let total    = samples.len();
    let split_at = ((total as f64) * train_ratio).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let valid = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        valid.len(),
    );

    (samples, valid)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes_follow_the_ratio() {
        let items: Vec<usize> = (0..100).collect();
        let (train, valid)    = split_train_valid(items, 0.8);
        assert_eq!(train.len(), 80);
        assert_eq!(valid.len(), 20);
    }

    #[test]
    fn train_size_is_rounded_not_truncated() {
        // round(5 * 0.5) = 3, not 2
        let items: Vec<usize> = (0..5).collect();
        let (train, valid)    = split_train_valid(items, 0.5);
        assert_eq!(train.len(), 3);
        assert_eq!(valid.len(), 2);
    }

    #[test]
    fn all_items_preserved() {
        let items: Vec<usize>  = (0..50).collect();
        let (train, valid)     = split_train_valid(items, 0.7);
        assert_eq!(train.len() + valid.len(), 50);

        let mut seen: Vec<usize> = train.into_iter().chain(valid).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, valid)    = split_train_valid(items, 0.8);
        assert!(train.is_empty());
        assert!(valid.is_empty());
    }
}
