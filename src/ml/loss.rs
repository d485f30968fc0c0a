// ============================================================
// Layer 4 — Negative Log-Likelihood Loss
// ============================================================
// The model already emits log-probabilities (log_softmax in its
// final layer), so the loss is just the mean of the negated
// target-class entries. Burn's built-in CrossEntropyLoss expects
// raw logits and would apply log_softmax a second time.

use burn::prelude::*;

/// Mean negative log-likelihood of the target classes.
///
/// `log_probs` is `[batch, n_classes]`, `targets` is `[batch]` with
/// class indices. Returns a single-element tensor so the caller can
/// run backward() on it directly.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [batch_size, _n_classes] = log_probs.dims();

    // Pick each row's target-class log-probability: [batch, 1]
    let picked = log_probs.gather(1, targets.reshape([batch_size, 1]));

    picked.mean().neg()
}
