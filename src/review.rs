/// Number of filter changes after which the rating prompt is shown once.
pub const REVIEW_THRESHOLD: u32 = 20;

/// Somewhere the filter change counter survives between runs.
pub trait CounterStore {
    fn load(&self) -> u32;
    fn store(&mut self, value: u32);
}

/// Decides when to ask for a review, independent of any UI.
#[derive(Debug, Clone, Copy)]
pub struct ReviewGate {
    threshold: u32,
}

impl Default for ReviewGate {
    fn default() -> Self {
        Self::new(REVIEW_THRESHOLD)
    }
}

impl ReviewGate {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Counts one filter change. Returns `true` only on the change that brings
    /// the counter to the threshold.
    pub fn record_change<S: CounterStore>(&self, store: &mut S) -> bool {
        let next = store.load().saturating_add(1);
        store.store(next);
        let fire = next == self.threshold;
        if fire {
            tracing::info!(count = next, "review prompt threshold reached");
        }
        fire
    }
}
