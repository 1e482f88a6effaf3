//! SA configuration and cooling schedules.

/// Temperature-reduction schedule.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Geometric cooling with plateau steps: every `step_length` sweeps,
    /// `T *= alpha`. Typical `alpha`: 0.90–0.99.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
        /// Sweeps between temperature changes.
        step_length: u32,
    },

    /// Lundy–Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`, one
    /// temperature change per sweep. Cools fast at high T, slow at low T.
    LundyMees {
        /// Cooling parameter, typically
        /// `(T_0 - T_min) / (max_sweeps * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric {
            alpha: 0.95,
            step_length: 100,
        }
    }
}

/// Configuration parameters for simulated annealing.
///
/// # Examples
///
/// ```
/// use incsearch::sa::{CoolingSchedule, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(50.0)
///     .with_min_temperature(0.01)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.9, step_length: 20 });
/// assert_eq!(config.initial_temperature, 50.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Starting temperature. Higher values accept more uphill moves.
    pub initial_temperature: f64,
    /// The run stops once the temperature drops below this.
    pub min_temperature: f64,
    /// Cooling schedule.
    pub cooling: CoolingSchedule,
    /// Stop after this many consecutive rejected candidates (the system
    /// has frozen). `u32::MAX` disables the check.
    pub max_rejects: u32,
    /// Cross-check every incremental cost against a full re-evaluation.
    pub verify_costs: bool,
    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: 1e-3,
            cooling: CoolingSchedule::default(),
            max_rejects: u32::MAX,
            verify_costs: cfg!(debug_assertions),
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_max_rejects(mut self, n: u32) -> Self {
        self.max_rejects = n;
        self
    }

    pub fn with_verify_costs(mut self, verify: bool) -> Self {
        self.verify_costs = verify;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the parameters for internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_temperature > 0.0) {
            return Err("min_temperature must be positive".into());
        }
        if self.initial_temperature < self.min_temperature {
            return Err("initial_temperature must be at least min_temperature".into());
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha, step_length } => {
                if !(0.0 < alpha && alpha < 1.0) {
                    return Err("geometric alpha must lie in (0, 1)".into());
                }
                if step_length == 0 {
                    return Err("geometric step_length must be at least 1".into());
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if !(beta > 0.0) {
                    return Err("Lundy-Mees beta must be positive".into());
                }
            }
        }
        Ok(())
    }
}
