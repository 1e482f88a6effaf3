//! Descent configuration.

/// Move-acceptance policy of a descent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescentPolicy {
    /// Scan the whole neighborhood, apply the globally best improving
    /// move; stop when the best available delta is non-negative.
    #[default]
    BestImprovement,
    /// Apply the first strictly improving move of a sweep and restart
    /// the sweep; stop when a full sweep finds nothing.
    FirstImprovement,
}

/// Configuration parameters for descent.
///
/// # Examples
///
/// ```
/// use incsearch::descent::{DescentConfig, DescentPolicy};
///
/// let config = DescentConfig::default()
///     .with_policy(DescentPolicy::FirstImprovement)
///     .with_verify_costs(true);
/// assert_eq!(config.policy, DescentPolicy::FirstImprovement);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescentConfig {
    /// Move-acceptance policy.
    pub policy: DescentPolicy,
    /// Cross-check every incremental cost against a full re-evaluation.
    /// Fatal on mismatch. Defaults to on in debug builds, but remains a
    /// runtime flag so test suites can enable it in any build profile.
    pub verify_costs: bool,
    /// Worker count for the parallel neighborhood-separation variant.
    /// 0 means "use the rayon thread-pool size".
    pub workers: usize,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            policy: DescentPolicy::BestImprovement,
            verify_costs: cfg!(debug_assertions),
            workers: 0,
        }
    }
}

impl DescentConfig {
    /// Sets the move-acceptance policy.
    pub fn with_policy(mut self, policy: DescentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables the incremental-cost cross-check.
    pub fn with_verify_costs(mut self, verify: bool) -> Self {
        self.verify_costs = verify;
        self
    }

    /// Sets the worker count for parallel sweeps (0 = rayon default).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}
