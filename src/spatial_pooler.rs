//! The spatial pooler: online, unsupervised learning of sparse distributed
//! representations over a competitive population of columns.
//!
//! This is the step controller (component I) wired to the overlap engine
//! (E), inhibition (F), Hebbian learning (G), and homeostasis (H), built on
//! top of [`crate::topology::Topology`] and [`crate::synapses::Synapses`].
//! See the crate-level docs for the full per-step data flow.

use crate::bitfield::BitField;
use crate::config::{SpatialPoolerConfig, INIT_CONNECTED_PCT};
use crate::error::{Result, SpError};
use crate::inhibition;
use crate::synapses::Synapses;
use crate::topology::{self, Topology};
use crate::utils::sample_without_replacement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Online spatial pooler over an N-dimensional column population.
///
/// Construction (`new`) performs the one-time potential-pool sampling and
/// permanence initialization; every subsequent call to
/// [`SpatialPooler::compute`] is a single deterministic step (concurrent
/// `compute` calls on the same instance are the caller's responsibility to
/// serialize).
#[derive(Clone, Debug)]
pub struct SpatialPooler {
    config: SpatialPoolerConfig,
    columns: Topology,
    inputs: Topology,
    synapses: Synapses,

    tie_breaker: Vec<f64>,
    overlap_duty: Vec<f64>,
    active_duty: Vec<f64>,
    min_overlap_duty: Vec<f64>,
    min_active_duty: Vec<f64>,
    boost: Vec<f64>,

    inhibition_radius: usize,
    iteration_num: u64,
    iteration_learn_num: u64,

    syn_perm_trim_threshold: f64,
    syn_perm_below_stimulus_inc: f64,
}

fn resolve_rng(seed: i64) -> StdRng {
    if seed < 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(seed as u64)
    }
}

/// Truncate to 5 decimal digits, matching the initializer's cross-platform
/// stability requirement.
fn truncate5(x: f64) -> f64 {
    (x * 1e5).floor() / 1e5
}

impl SpatialPooler {
    /// Validate `config`, sample potential pools, and initialize
    /// permanences, duty cycles, boosts, the tie-breaker, and the initial
    /// inhibition radius.
    ///
    /// Fails with [`SpError::Config`] if `config` violates any constraint
    /// in [`SpatialPoolerConfig::validate`], or if any column's sampled
    /// potential pool is smaller than `stimulus_threshold` (the one
    /// constraint that can only be checked once pools exist).
    pub fn new(config: SpatialPoolerConfig) -> Result<Self> {
        config.validate()?;

        let columns = Topology::new(config.column_dimensions.clone())?;
        let inputs = Topology::new(config.input_dimensions.clone())?;
        let num_columns = columns.size();
        let num_inputs = inputs.size();

        let syn_perm_trim_threshold = config.syn_perm_active_inc / 2.0;
        let syn_perm_below_stimulus_inc = config.syn_perm_connected / 10.0;
        let potential_radius = config.potential_radius.min(num_inputs);

        let mut rng = resolve_rng(config.seed);
        let mut synapses = Synapses::new(num_columns, num_inputs);

        for c in 0..num_columns {
            let center = columns.map_column_center(c, &inputs)?;
            let mut candidates = inputs.neighbors(center, potential_radius, config.wrap_around);
            if !candidates.contains(&center) {
                candidates.push(center);
            }
            candidates.sort_unstable();
            candidates.dedup();

            let num_potential = ((candidates.len() as f64) * config.potential_pct).round() as usize;
            let sampled = sample_without_replacement(&candidates, num_potential, &mut rng);

            if sampled.len() < config.stimulus_threshold {
                return Err(SpError::Config(format!(
                    "column {c} potential pool size {} is smaller than stimulusThreshold {}",
                    sampled.len(),
                    config.stimulus_threshold
                )));
            }

            let mut potential = BitField::new(num_inputs);
            potential.set_acts(&sampled);
            synapses.set_potential(c, potential);

            let mut perm = vec![0.0f64; num_inputs];
            for &j in &sampled {
                let branch: f64 = rng.gen();
                let raw = if branch < INIT_CONNECTED_PCT {
                    config.syn_perm_connected + rng.gen::<f64>() * (1.0 - config.syn_perm_connected)
                } else {
                    rng.gen::<f64>() * config.syn_perm_connected
                };
                let truncated = truncate5(raw);
                perm[j] = if truncated < syn_perm_trim_threshold {
                    0.0
                } else {
                    truncated
                };
            }

            synapses.update_column(
                c,
                perm,
                true,
                config.syn_perm_connected,
                syn_perm_trim_threshold,
                syn_perm_below_stimulus_inc,
                config.stimulus_threshold,
            )?;
        }

        let tie_breaker: Vec<f64> = (0..num_columns).map(|_| 0.01 * rng.gen::<f64>()).collect();

        let mut sp = Self {
            config,
            columns,
            inputs,
            synapses,
            tie_breaker,
            overlap_duty: vec![0.0; num_columns],
            active_duty: vec![0.0; num_columns],
            min_overlap_duty: vec![0.0; num_columns],
            min_active_duty: vec![0.0; num_columns],
            boost: vec![1.0; num_columns],
            inhibition_radius: 1,
            iteration_num: 0,
            iteration_learn_num: 0,
            syn_perm_trim_threshold,
            syn_perm_below_stimulus_inc,
        };
        sp.update_inhibition_radius();

        log::debug!(
            "SpatialPooler initialized: {num_columns} columns over {num_inputs} inputs, \
             initial inhibition radius {}",
            sp.inhibition_radius
        );

        Ok(sp)
    }

    // ---- step controller -------------------------------------------------

    /// Run one step: overlap -> (boost) -> inhibition -> winners, learning
    /// and homeostasis if `learn`. Equivalent to
    /// `compute_ex(input, learn, out, true)`.
    pub fn compute(&mut self, input: &BitField, learn: bool, out: &mut BitField) -> Result<()> {
        self.compute_ex(input, learn, out, true)
    }

    /// Full form of [`SpatialPooler::compute`] with an explicit
    /// `strip_never_learned` flag (defaults to `true`).
    pub fn compute_ex(
        &mut self,
        input: &BitField,
        learn: bool,
        out: &mut BitField,
        strip_never_learned: bool,
    ) -> Result<()> {
        let num_inputs = self.inputs.size();
        let num_columns = self.columns.size();

        if input.num_bits() != num_inputs {
            return Err(SpError::Shape {
                expected: num_inputs,
                actual: input.num_bits(),
            });
        }
        if out.num_bits() != num_columns {
            return Err(SpError::Shape {
                expected: num_columns,
                actual: out.num_bits(),
            });
        }

        self.iteration_num += 1;
        if learn {
            self.iteration_learn_num += 1;
        }

        let overlap = self.compute_overlap(input);
        let scored: Vec<f64> = if learn {
            overlap
                .iter()
                .zip(&self.boost)
                .map(|(&o, &b)| o as f64 * b)
                .collect()
        } else {
            overlap.iter().map(|&o| o as f64).collect()
        };

        let density = inhibition::compute_density(
            self.config.local_area_density,
            self.config.num_active_columns_per_inh_area,
            num_columns,
            self.inhibition_radius,
            self.columns.rank(),
        );
        let mut winners = inhibition::select_winners(
            &scored,
            &self.tie_breaker,
            &self.columns,
            self.inhibition_radius,
            self.config.global_inhibition,
            density,
        );

        if learn {
            self.learn(input, &winners)?;
            self.update_duty_cycles(&overlap, &winners);
            self.bump_weak_columns()?;
            self.update_boost_factors();

            if self.iteration_num % self.config.update_period as u64 == 0 {
                self.update_inhibition_radius();
                self.update_min_duty_cycles();
                log::trace!(
                    "iteration {}: inhibition radius now {}",
                    self.iteration_num,
                    self.inhibition_radius
                );
            }
        } else if strip_never_learned {
            winners = self.strip_unlearned_columns(&winners);
        }

        out.clear_all();
        out.set_acts(&winners);
        Ok(())
    }

    /// Remove every column with `active_duty == 0` (never won while
    /// learning) from `winners`. Exposed both as the internal
    /// non-learning path and as a standalone operation.
    pub fn strip_unlearned_columns(&self, winners: &[usize]) -> Vec<usize> {
        winners
            .iter()
            .copied()
            .filter(|&c| self.active_duty[c] != 0.0)
            .collect()
    }

    // ---- overlap engine ---------------------------------------------------

    fn compute_overlap(&self, input: &BitField) -> Vec<u32> {
        (0..self.columns.size())
            .map(|c| {
                let ov = self.synapses.connected(c).num_similar(input) as u32;
                if (ov as usize) < self.config.stimulus_threshold {
                    0
                } else {
                    ov
                }
            })
            .collect()
    }

    // ---- learning (Hebbian) -----------------------------------------------

    fn learn(&mut self, input: &BitField, winners: &[usize]) -> Result<()> {
        for &c in winners {
            let members = self.synapses.potential(c).get_acts();
            let mut perm = self.synapses.permanence(c).to_vec();
            for &j in &members {
                if input.get_bit(j) != 0 {
                    perm[j] += self.config.syn_perm_active_inc;
                } else {
                    perm[j] -= self.config.syn_perm_inactive_dec;
                }
            }
            self.synapses.update_column(
                c,
                perm,
                true,
                self.config.syn_perm_connected,
                self.syn_perm_trim_threshold,
                self.syn_perm_below_stimulus_inc,
                self.config.stimulus_threshold,
            )?;
        }
        Ok(())
    }

    // ---- homeostasis -------------------------------------------------------

    fn update_duty_cycles(&mut self, overlap: &[u32], winners: &[usize]) {
        let period = (self.config.duty_cycle_period as u64).min(self.iteration_num) as f64;

        let mut is_winner = vec![false; self.columns.size()];
        for &c in winners {
            is_winner[c] = true;
        }

        for c in 0..self.columns.size() {
            let v_o = if overlap[c] > 0 { 1.0 } else { 0.0 };
            let v_a = if is_winner[c] { 1.0 } else { 0.0 };
            self.overlap_duty[c] = ((period - 1.0) * self.overlap_duty[c] + v_o) / period;
            self.active_duty[c] = ((period - 1.0) * self.active_duty[c] + v_a) / period;
        }
    }

    /// Weak-column bump: columns whose overlap duty cycle has fallen below
    /// its floor get `syn_perm_below_stimulus_inc` added across their whole
    /// potential pool, via the guarded path with `raise=false`. A bumped
    /// column's connected count can legitimately dip below
    /// `stimulus_threshold` until the next learning pass, which always
    /// raises.
    fn bump_weak_columns(&mut self) -> Result<()> {
        for c in 0..self.columns.size() {
            if self.overlap_duty[c] >= self.min_overlap_duty[c] {
                continue;
            }
            let members = self.synapses.potential(c).get_acts();
            let mut perm = self.synapses.permanence(c).to_vec();
            for &j in &members {
                perm[j] += self.syn_perm_below_stimulus_inc;
            }
            self.synapses.update_column(
                c,
                perm,
                false,
                self.config.syn_perm_connected,
                self.syn_perm_trim_threshold,
                self.syn_perm_below_stimulus_inc,
                self.config.stimulus_threshold,
            )?;
        }
        Ok(())
    }

    /// This does not hard-clamp `boost` into `[1, max_boost]`; it reproduces
    /// the source's envelope exactly. The `debug_assert!` documents the
    /// expected range without changing release behavior.
    fn update_boost_factors(&mut self) {
        for c in 0..self.columns.size() {
            let m = self.min_active_duty[c];
            if m > 0.0 {
                self.boost[c] = ((1.0 - self.config.max_boost) / m) * self.active_duty[c]
                    + self.config.max_boost;
            }
            if self.active_duty[c] > m {
                self.boost[c] = 1.0;
            }
            debug_assert!(
                self.boost[c] >= 1.0 - 1e-9 && self.boost[c] <= self.config.max_boost + 1e-6,
                "boost[{c}] = {} outside expected envelope",
                self.boost[c]
            );
        }
    }

    /// Uses `R > num_inputs` (not `num_columns` or the column dimensions'
    /// max) as the "effectively global" test, matching the source exactly;
    /// this is a different threshold than [`inhibition::select_winners`]
    /// uses for the same purpose, and intentionally so.
    fn update_min_duty_cycles(&mut self) {
        let num_columns = self.columns.size();
        let global = self.config.global_inhibition || self.inhibition_radius > self.inputs.size();

        if global {
            let max_overlap = self.overlap_duty.iter().cloned().fold(f64::MIN, f64::max);
            let max_active = self.active_duty.iter().cloned().fold(f64::MIN, f64::max);
            for c in 0..num_columns {
                self.min_overlap_duty[c] = self.config.min_pct_overlap_duty_cycles * max_overlap;
                self.min_active_duty[c] = self.config.min_pct_active_duty_cycles * max_active;
            }
        } else {
            for c in 0..num_columns {
                let neighbors = self.columns.neighbors(c, self.inhibition_radius, false);
                let mut max_overlap = self.overlap_duty[c];
                let mut max_active = self.active_duty[c];
                for &n in &neighbors {
                    max_overlap = max_overlap.max(self.overlap_duty[n]);
                    max_active = max_active.max(self.active_duty[n]);
                }
                self.min_overlap_duty[c] = self.config.min_pct_overlap_duty_cycles * max_overlap;
                self.min_active_duty[c] = self.config.min_pct_active_duty_cycles * max_active;
            }
        }
    }

    fn update_inhibition_radius(&mut self) {
        if self.config.global_inhibition {
            self.inhibition_radius = *self.columns.dims().iter().max().unwrap();
            return;
        }

        let num_columns = self.columns.size();
        let avg_span: f64 = (0..num_columns)
            .map(|c| {
                let connected = self.synapses.connected(c).get_acts();
                topology::avg_connected_span_for_column(&connected, &self.inputs)
            })
            .sum::<f64>()
            / num_columns as f64;
        let avg_cols_per_input = topology::avg_columns_per_input(self.columns.dims(), self.inputs.dims());

        let raw = (avg_span * avg_cols_per_input - 1.0) / 2.0;
        let rounded = raw.round();
        self.inhibition_radius = if rounded < 1.0 { 1 } else { rounded as usize };
    }

    // ---- accessors ---------------------------------------------------------

    fn check_column(&self, c: usize) -> Result<()> {
        let num_columns = self.columns.size();
        if c >= num_columns {
            Err(SpError::Index {
                index: c,
                num_columns,
            })
        } else {
            Ok(())
        }
    }

    fn check_shape(expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            Err(SpError::Shape { expected, actual })
        } else {
            Ok(())
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.size()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.size()
    }

    pub fn input_dimensions(&self) -> &[usize] {
        self.inputs.dims()
    }

    pub fn column_dimensions(&self) -> &[usize] {
        self.columns.dims()
    }

    pub fn config(&self) -> &SpatialPoolerConfig {
        &self.config
    }

    pub fn potential_radius(&self) -> usize {
        self.config.potential_radius.min(self.inputs.size())
    }

    pub fn potential_pct(&self) -> f64 {
        self.config.potential_pct
    }

    pub fn global_inhibition(&self) -> bool {
        self.config.global_inhibition
    }

    pub fn local_area_density(&self) -> f64 {
        self.config.local_area_density
    }

    pub fn num_active_columns_per_inh_area(&self) -> f64 {
        self.config.num_active_columns_per_inh_area
    }

    pub fn stimulus_threshold(&self) -> usize {
        self.config.stimulus_threshold
    }

    pub fn duty_cycle_period(&self) -> u32 {
        self.config.duty_cycle_period
    }

    pub fn max_boost(&self) -> f64 {
        self.config.max_boost
    }

    pub fn update_period(&self) -> u32 {
        self.config.update_period
    }

    pub fn seed(&self) -> i64 {
        self.config.seed
    }

    pub fn iteration_num(&self) -> u64 {
        self.iteration_num
    }

    pub fn iteration_learn_num(&self) -> u64 {
        self.iteration_learn_num
    }

    pub fn inhibition_radius(&self) -> usize {
        self.inhibition_radius
    }

    /// Escape hatch for tests/debug harnesses; bypasses the normal
    /// `update_period`-gated recompute schedule (present in the source for
    /// the same reason).
    pub fn set_inhibition_radius(&mut self, radius: usize) {
        self.inhibition_radius = radius;
    }

    /// Crate/schema version string, not the persisted-state `version` field.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn get_potential(&self, c: usize, out: &mut BitField) -> Result<()> {
        self.check_column(c)?;
        Self::check_shape(self.inputs.size(), out.num_bits())?;
        *out = self.synapses.potential(c).clone();
        Ok(())
    }

    /// Requires `|{ j : vec[j] != 0 }| >= stimulus_threshold`. Unlike
    /// `set_permanence`, this does not go through the guarded update path;
    /// it overwrites the potential-pool mask directly, matching the
    /// source's behavior. A stale permanence row outside the new pool is
    /// repaired by the next guarded write to that column.
    pub fn set_potential(&mut self, c: usize, vec: &BitField) -> Result<()> {
        self.check_column(c)?;
        Self::check_shape(self.inputs.size(), vec.num_bits())?;
        if vec.num_set() < self.config.stimulus_threshold {
            return Err(SpError::Config(format!(
                "potential pool size {} is smaller than stimulusThreshold {}",
                vec.num_set(),
                self.config.stimulus_threshold
            )));
        }
        self.synapses.set_potential(c, vec.clone());
        Ok(())
    }

    pub fn get_permanence(&self, c: usize, out: &mut [f64]) -> Result<()> {
        self.check_column(c)?;
        Self::check_shape(self.inputs.size(), out.len())?;
        out.copy_from_slice(self.synapses.permanence(c));
        Ok(())
    }

    /// Goes through the guarded update path with `raise=false`.
    pub fn set_permanence(&mut self, c: usize, vec: &[f64]) -> Result<()> {
        self.check_column(c)?;
        Self::check_shape(self.inputs.size(), vec.len())?;
        self.synapses.update_column(
            c,
            vec.to_vec(),
            false,
            self.config.syn_perm_connected,
            self.syn_perm_trim_threshold,
            self.syn_perm_below_stimulus_inc,
            self.config.stimulus_threshold,
        )
    }

    pub fn get_connected_synapses(&self, c: usize, out: &mut BitField) -> Result<()> {
        self.check_column(c)?;
        Self::check_shape(self.inputs.size(), out.num_bits())?;
        *out = self.synapses.connected(c).clone();
        Ok(())
    }

    pub fn get_connected_counts(&self, out: &mut [u32]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        for c in 0..self.columns.size() {
            out[c] = self.synapses.connected_count(c);
        }
        Ok(())
    }

    pub fn get_overlap_duty_cycles(&self, out: &mut [f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        out.copy_from_slice(&self.overlap_duty);
        Ok(())
    }

    pub fn get_active_duty_cycles(&self, out: &mut [f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        out.copy_from_slice(&self.active_duty);
        Ok(())
    }

    pub fn get_min_overlap_duty_cycles(&self, out: &mut [f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        out.copy_from_slice(&self.min_overlap_duty);
        Ok(())
    }

    pub fn get_min_active_duty_cycles(&self, out: &mut [f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        out.copy_from_slice(&self.min_active_duty);
        Ok(())
    }

    pub fn get_boost_factors(&self, out: &mut [f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), out.len())?;
        out.copy_from_slice(&self.boost);
        Ok(())
    }

    pub fn set_boost_factors(&mut self, vals: &[f64]) -> Result<()> {
        Self::check_shape(self.columns.size(), vals.len())?;
        self.boost.copy_from_slice(vals);
        Ok(())
    }

    // ---- persistence support (crate::persistence) --------------------------

    /// Per-instance constant tie-breaker vector. Drawn once at construction
    /// and never mutated afterward.
    pub(crate) fn tie_breaker(&self) -> &[f64] {
        &self.tie_breaker
    }

    pub(crate) fn synapses(&self) -> &Synapses {
        &self.synapses
    }

    pub(crate) fn overlap_duty(&self) -> &[f64] {
        &self.overlap_duty
    }

    pub(crate) fn active_duty(&self) -> &[f64] {
        &self.active_duty
    }

    pub(crate) fn min_overlap_duty(&self) -> &[f64] {
        &self.min_overlap_duty
    }

    pub(crate) fn min_active_duty(&self) -> &[f64] {
        &self.min_active_duty
    }

    pub(crate) fn boost(&self) -> &[f64] {
        &self.boost
    }

    pub(crate) fn syn_perm_trim_threshold(&self) -> f64 {
        self.syn_perm_trim_threshold
    }

    pub(crate) fn syn_perm_below_stimulus_inc(&self) -> f64 {
        self.syn_perm_below_stimulus_inc
    }

    /// Reassemble a `SpatialPooler` from already-validated, already-guarded
    /// state. Used exclusively by `crate::persistence`'s `from_state`. The
    /// synapse store passed in must already have had every column run
    /// through the guarded update path (`raise = false`), since this
    /// constructor does not call it again.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: SpatialPoolerConfig,
        columns: Topology,
        inputs: Topology,
        synapses: Synapses,
        tie_breaker: Vec<f64>,
        overlap_duty: Vec<f64>,
        active_duty: Vec<f64>,
        min_overlap_duty: Vec<f64>,
        min_active_duty: Vec<f64>,
        boost: Vec<f64>,
        inhibition_radius: usize,
        iteration_num: u64,
        iteration_learn_num: u64,
        syn_perm_trim_threshold: f64,
        syn_perm_below_stimulus_inc: f64,
    ) -> Self {
        Self {
            config,
            columns,
            inputs,
            synapses,
            tie_breaker,
            overlap_duty,
            active_duty,
            min_overlap_duty,
            min_active_duty,
            boost,
            inhibition_radius,
            iteration_num,
            iteration_learn_num,
            syn_perm_trim_threshold,
            syn_perm_below_stimulus_inc,
        }
    }
}
