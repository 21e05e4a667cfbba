//! Aliasing statistics (spec §4.8): "attempts, successes, failures, bytes
//! saved, bytes allocated; success rate and savings percentage are
//! derived."

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AliasStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub bytes_saved: u64,
    pub bytes_allocated: u64,
}

impl AliasStats {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }

    pub fn savings_percentage(&self) -> f64 {
        let total = self.bytes_saved + self.bytes_allocated;
        if total == 0 {
            0.0
        } else {
            self.bytes_saved as f64 / total as f64 * 100.0
        }
    }
}
