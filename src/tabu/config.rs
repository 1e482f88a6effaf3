//! Tabu search configuration.

/// Configuration parameters for tabu search.
///
/// The effective tenure of every application is drawn uniformly from
/// ±10% around the configured base value, separately for the "in" and
/// "out" directions, so parallel instances do not lock into the same
/// cycle pattern.
///
/// # Examples
///
/// ```
/// use incsearch::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_tenure(12)
///     .with_max_cycles(5_000)
///     .with_seed(42);
/// assert_eq!(config.tenure_in, 12);
/// assert_eq!(config.tenure_out, 12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Base tenure for forbidding a move's forward direction.
    pub tenure_in: u32,
    /// Base tenure for forbidding a move's reverse direction.
    pub tenure_out: u32,
    /// Iteration budget.
    pub max_cycles: u32,
    /// Probability of returning the final current solution instead of
    /// the best-ever one when the run did not improve on its input;
    /// used as restart diversification by outer loops.
    pub return_current: f64,
    /// Cross-check every incremental cost (and every scanned gain
    /// entry) against a full re-evaluation. Fatal on mismatch.
    pub verify_costs: bool,
    /// Worker count for the parallel neighborhood-separation variant.
    /// 0 means "use the rayon thread-pool size".
    pub workers: usize,
    /// Random seed for tenure randomization (None for random).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure_in: 8,
            tenure_out: 8,
            max_cycles: 1_000,
            return_current: 0.0,
            verify_costs: cfg!(debug_assertions),
            workers: 0,
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Sets both tenures to the same base value.
    pub fn with_tenure(mut self, tenure: u32) -> Self {
        self.tenure_in = tenure;
        self.tenure_out = tenure;
        self
    }

    /// Sets the forward-direction tenure.
    pub fn with_tenure_in(mut self, tenure: u32) -> Self {
        self.tenure_in = tenure;
        self
    }

    /// Sets the reverse-direction tenure.
    pub fn with_tenure_out(mut self, tenure: u32) -> Self {
        self.tenure_out = tenure;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_cycles(mut self, cycles: u32) -> Self {
        self.max_cycles = cycles;
        self
    }

    /// Sets the probability of returning the final current solution.
    pub fn with_return_current(mut self, p: f64) -> Self {
        self.return_current = p;
        self
    }

    /// Enables or disables the incremental-cost cross-checks.
    pub fn with_verify_costs(mut self, verify: bool) -> Self {
        self.verify_costs = verify;
        self
    }

    /// Sets the worker count for parallel sweeps (0 = rayon default).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TabuConfig::default();
        assert_eq!(config.tenure_in, 8);
        assert_eq!(config.tenure_out, 8);
        assert_eq!(config.max_cycles, 1_000);
        assert_eq!(config.return_current, 0.0);
        assert_eq!(config.workers, 0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder() {
        let config = TabuConfig::default()
            .with_tenure(20)
            .with_tenure_out(5)
            .with_max_cycles(99)
            .with_return_current(0.5)
            .with_workers(4)
            .with_seed(7);
        assert_eq!(config.tenure_in, 20);
        assert_eq!(config.tenure_out, 5);
        assert_eq!(config.max_cycles, 99);
        assert_eq!(config.return_current, 0.5);
        assert_eq!(config.workers, 4);
        assert_eq!(config.seed, Some(7));
    }
}
