/// Running byte count for a streamed response body.
///
/// `loaded` never decreases and never exceeds a declared total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressCounter {
    loaded: u64,
    total: Option<u64>,
}

impl ProgressCounter {
    pub fn new(total: Option<u64>) -> Self {
        Self { loaded: 0, total }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    /// Declared body length, if the response carried one.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Bytes still expected, or `None` when the total is unknown.
    pub fn remaining(&self) -> Option<u64> {
        self.total.map(|total| total.saturating_sub(self.loaded))
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Record `bytes` more delivered and return the new cumulative count.
    pub fn advance(&mut self, bytes: u64) -> u64 {
        let next = self.loaded.saturating_add(bytes);
        self.loaded = match self.total {
            Some(total) => next.min(total),
            None => next,
        };
        self.loaded
    }

    /// Percentage of the declared total, `None` if unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.loaded as f64 / total as f64) * 100.0
            }
        })
    }
}
