use crate::Reporter;

/// Total used when the measured total is zero, so that percentages stay
/// well defined for empty trees.
pub const FALLBACK_TOTAL: u64 = 100;

/// Per-request `(processed, total)` byte counters.
///
/// `processed` never exceeds `total`, so the reported percentage is
/// non-decreasing and capped at 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLedger {
    processed: u64,
    total: u64,
}

impl ProgressLedger {
    pub fn new(total: u64) -> Self {
        Self {
            processed: 0,
            total: if total == 0 { FALLBACK_TOTAL } else { total },
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current percentage, rounded down.
    pub fn percent(&self) -> u8 {
        let pct = u128::from(self.processed) * 100 / u128::from(self.total);
        pct.min(100) as u8
    }

    /// Records `bytes` of work and emits the new percentage.
    pub fn advance(&mut self, bytes: u64, reporter: &dyn Reporter) {
        self.processed = self.processed.saturating_add(bytes).min(self.total);
        reporter.progress(self.percent());
    }

    /// Marks the ledger complete and emits `100`.
    pub fn finish(&mut self, reporter: &dyn Reporter) {
        self.processed = self.total;
        reporter.progress(100);
    }
}
