// ============================================================
// Layer 4 — Best-State Tracker
// ============================================================
// Retains a snapshot of the model parameters at the epoch with the
// lowest validation loss seen so far. The snapshot is a deep copy
// of the parameter record, so later optimizer steps cannot touch it.
//
// Policy: strict improvement only. An epoch that merely ties the
// lowest loss does not replace the retained snapshot, and NaN
// (e.g. from an empty validation set) never improves on anything.
//
// Generic over the snapshot payload so the policy is testable
// without building tensors.

/// The retained best state: which epoch it came from, its validation
/// loss, and the parameter snapshot taken at that point.
#[derive(Debug)]
pub struct BestState<S> {
    pub epoch:    usize,
    pub loss:     f64,
    pub snapshot: S,
}

#[derive(Debug)]
pub struct BestTracker<S> {
    best: Option<BestState<S>>,
}

impl<S> BestTracker<S> {
    pub fn new() -> Self {
        Self { best: None }
    }

    /// Record one epoch's validation loss. The snapshot closure is
    /// only invoked when the epoch strictly improves on the lowest
    /// loss seen so far; returns whether it did.
    pub fn observe<F>(&mut self, epoch: usize, loss: f64, snapshot: F) -> bool
    where
        F: FnOnce() -> S,
    {
        let lowest = self.lowest_loss();
        // NaN < x is false, so NaN epochs can never become the best
        if loss < lowest {
            self.best = Some(BestState {
                epoch,
                loss,
                snapshot: snapshot(),
            });
            true
        } else {
            false
        }
    }

    /// Lowest validation loss observed so far; +inf before any epoch.
    pub fn lowest_loss(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.loss)
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|b| b.epoch)
    }

    pub fn into_best(self) -> Option<BestState<S>> {
        self.best
    }
}

impl<S> Default for BestTracker<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_the_last_strict_minimum() {
        let mut tracker = BestTracker::new();

        // Snapshot payload is the epoch index itself, so we can tell
        // exactly which epoch the retained state came from.
        for (epoch, loss) in [0.9, 0.5, 0.7, 0.5, 0.3].into_iter().enumerate() {
            tracker.observe(epoch, loss, || epoch);
        }

        let best = tracker.into_best().unwrap();
        assert_eq!(best.epoch, 4);
        assert_eq!(best.snapshot, 4);
        assert!((best.loss - 0.3).abs() < 1e-12);
    }

    #[test]
    fn ties_do_not_replace_the_snapshot() {
        let mut tracker = BestTracker::new();

        assert!(tracker.observe(0, 0.5, || 0));
        // Same loss again: not an improvement, snapshot closure unused
        assert!(!tracker.observe(1, 0.5, || panic!("tie must not snapshot")));

        assert_eq!(tracker.best_epoch(), Some(0));
    }

    #[test]
    fn nan_never_improves() {
        let mut tracker: BestTracker<usize> = BestTracker::new();

        assert!(!tracker.observe(0, f64::NAN, || 0));
        assert!(tracker.into_best().is_none());
    }

    #[test]
    fn lowest_loss_starts_at_infinity() {
        let tracker: BestTracker<usize> = BestTracker::new();
        assert_eq!(tracker.lowest_loss(), f64::INFINITY);
    }
}
