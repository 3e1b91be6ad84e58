//! Spatial pooler configuration: the recognized keys, plus a single
//! validated entry point.
//!
//! `SpatialPoolerConfig::validate` runs every construction-time constraint
//! check in one place, first violation wins, mirroring the corpus's
//! `network_config.rs` builder conventions generalized to a flat struct
//! since the spatial pooler has no sub-block composition to express.

use crate::error::{Result, SpError};
use serde::{Deserialize, Serialize};

/// Fraction of a column's sampled potential-pool bits that start out
/// connected at construction time. Hardcoded in the source this crate is
/// grounded on, not exposed as a config key.
pub(crate) const INIT_CONNECTED_PCT: f64 = 0.5;

/// All recognized configuration keys for [`crate::SpatialPooler`].
///
/// `update_period` is an ambient addition: the source hardcodes it to 50,
/// this crate exposes it as a field (default 50) so tests can use a small
/// period without touching the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialPoolerConfig {
    /// Per-dimension sizes of the input space. `numInputs = product(..)`.
    pub input_dimensions: Vec<usize>,
    /// Per-dimension sizes of the column space. `numColumns = product(..)`.
    pub column_dimensions: Vec<usize>,
    /// Candidate-pool half-width in each input dimension, clamped to
    /// `numInputs`.
    pub potential_radius: usize,
    /// Fraction of candidates retained in each column's potential pool,
    /// in `(0, 1]`.
    pub potential_pct: f64,
    /// When set, inhibition is region-wide top-K instead of local.
    pub global_inhibition: bool,
    /// Target activation density, in `(0, 0.5]`. Mutually exclusive with
    /// `num_active_columns_per_inh_area` (exactly one must be positive).
    pub local_area_density: f64,
    /// Target number of active columns per inhibition area. Mutually
    /// exclusive with `local_area_density`.
    pub num_active_columns_per_inh_area: f64,
    /// Minimum overlap (and minimum potential-pool connected count) for a
    /// column to be considered at all.
    pub stimulus_threshold: usize,
    /// Permanence decrement applied to inactive potential-pool bits of a
    /// winning column.
    pub syn_perm_inactive_dec: f64,
    /// Permanence increment applied to active potential-pool bits of a
    /// winning column.
    pub syn_perm_active_inc: f64,
    /// Permanence value at and above which a synapse counts as connected.
    pub syn_perm_connected: f64,
    /// Floor, as a fraction of the region's max overlap duty cycle, below
    /// which a column is bumped.
    pub min_pct_overlap_duty_cycles: f64,
    /// Floor, as a fraction of the region's max active duty cycle, below
    /// which a column's boost climbs toward `max_boost`.
    pub min_pct_active_duty_cycles: f64,
    /// Window size (in learning steps) of the duty-cycle exponential
    /// moving average.
    pub duty_cycle_period: u32,
    /// Upper bound of the boost factor envelope.
    pub max_boost: f64,
    /// RNG seed. Any negative value selects OS entropy (non-deterministic);
    /// any non-negative value is widened to `u64` and seeds `StdRng`.
    pub seed: i64,
    /// Topology boundary policy used by the initializer only; local
    /// inhibition's neighbor enumeration always uses `wrap = false`
    /// regardless of this flag.
    pub wrap_around: bool,
    /// Diagnostics verbosity level. Out of scope algorithmically; carried
    /// only so persisted state round-trips the field.
    pub sp_verbosity: u8,
    /// How often (in learning steps) the inhibition radius and min-duty
    /// floors are recomputed. The source hardcodes this to 50.
    pub update_period: u32,
}

impl Default for SpatialPoolerConfig {
    fn default() -> Self {
        Self {
            input_dimensions: vec![32, 32],
            column_dimensions: vec![64, 64],
            potential_radius: 16,
            potential_pct: 0.5,
            global_inhibition: false,
            local_area_density: 0.0,
            num_active_columns_per_inh_area: 10.0,
            stimulus_threshold: 0,
            syn_perm_inactive_dec: 0.008,
            syn_perm_active_inc: 0.05,
            syn_perm_connected: 0.1,
            min_pct_overlap_duty_cycles: 0.001,
            min_pct_active_duty_cycles: 0.001,
            duty_cycle_period: 1000,
            max_boost: 10.0,
            seed: -1,
            wrap_around: true,
            sp_verbosity: 0,
            update_period: 50,
        }
    }
}

impl SpatialPoolerConfig {
    /// Run every construction-time constraint check, first violation wins.
    ///
    /// Does not check `stimulus_threshold` against any individual column's
    /// potential-pool size, since that information only exists after the
    /// initializer samples each pool; a pool smaller than `stimulus_threshold`
    /// instead surfaces as a `ConfigError` from [`crate::SpatialPooler::new`]
    /// at the point it becomes known.
    pub fn validate(&self) -> Result<()> {
        if self.input_dimensions.is_empty() || self.column_dimensions.is_empty() {
            return Err(SpError::Config(
                "inputDimensions and columnDimensions must be non-empty".into(),
            ));
        }
        if self.input_dimensions.len() != self.column_dimensions.len() {
            return Err(SpError::Config(
                "inputDimensions and columnDimensions must have equal rank".into(),
            ));
        }
        if self.input_dimensions.iter().any(|&d| d == 0)
            || self.column_dimensions.iter().any(|&d| d == 0)
        {
            return Err(SpError::Config(
                "inputDimensions and columnDimensions must be all non-zero".into(),
            ));
        }

        let num_inputs: usize = self.input_dimensions.iter().product();
        let num_columns: usize = self.column_dimensions.iter().product();
        if num_inputs == 0 || num_columns == 0 {
            return Err(SpError::Config("numInputs and numColumns must be > 0".into()));
        }

        if !(self.potential_pct > 0.0 && self.potential_pct <= 1.0) {
            return Err(SpError::Config("potentialPct must be in (0, 1]".into()));
        }

        let density_active = self.local_area_density > 0.0;
        let count_active = self.num_active_columns_per_inh_area > 0.0;
        if density_active == count_active {
            return Err(SpError::Config(
                "exactly one of localAreaDensity or numActiveColumnsPerInhArea must be positive"
                    .into(),
            ));
        }

        for (name, val) in [
            ("synPermInactiveDec", self.syn_perm_inactive_dec),
            ("synPermActiveInc", self.syn_perm_active_inc),
            ("synPermConnected", self.syn_perm_connected),
        ] {
            if !(val > 0.0 && val < 1.0) {
                return Err(SpError::Config(format!("{name} must be in (0, 1)")));
            }
        }
        let trim_threshold = self.syn_perm_active_inc / 2.0;
        if !(trim_threshold < self.syn_perm_connected) {
            return Err(SpError::Config(
                "synPermActiveInc/2 (trim threshold) must be < synPermConnected".into(),
            ));
        }

        for (name, val) in [
            ("minPctOverlapDutyCycles", self.min_pct_overlap_duty_cycles),
            ("minPctActiveDutyCycles", self.min_pct_active_duty_cycles),
        ] {
            if !(0.0..=1.0).contains(&val) {
                return Err(SpError::Config(format!("{name} must be in [0, 1]")));
            }
        }

        if self.duty_cycle_period < 1 {
            return Err(SpError::Config("dutyCyclePeriod must be >= 1".into()));
        }
        if self.max_boost < 1.0 {
            return Err(SpError::Config("maxBoost must be >= 1".into()));
        }
        if self.update_period < 1 {
            return Err(SpError::Config("updatePeriod must be >= 1".into()));
        }

        Ok(())
    }

    /// `Ni = product(input_dimensions)`.
    pub fn num_inputs(&self) -> usize {
        self.input_dimensions.iter().product()
    }

    /// `Nc = product(column_dimensions)`.
    pub fn num_columns(&self) -> usize {
        self.column_dimensions.iter().product()
    }
}
