//! Persisted-state schema and `save`/`load` for [`crate::SpatialPooler`].
//!
//! Follows the `NetworkConfig` dual-format pattern (`to_json`/`from_json`
//! via `serde_json`, `save`/`load` via `bincode`) so the persisted-state
//! schema is a fully implemented, in-scope operation rather than a stub.
//!
//! Potential pools and permanences are stored sparsely: per column, a
//! sorted list of potential-pool indices and a list of `(index, value)`
//! pairs for the nonzero permanence entries restricted to that pool.
//! `connectedSynapses` and `connectedCount` are never serialized; `load`
//! recomputes both by replaying the guarded update with `raise=false` over
//! every stored row.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bitfield::BitField;
use crate::config::SpatialPoolerConfig;
use crate::error::{Result, SpError};
use crate::spatial_pooler::SpatialPooler;
use crate::synapses::Synapses;
use crate::topology::Topology;

/// Current schema version written by [`SpatialPooler::save`]. A `version = 1`
/// record (no `wrap_around` field yet) is accepted by [`SpatialPooler::load`]
/// and migrated by forcing `wrap_around = true`, matching the original's
/// `__setstate__` migration rule.
pub const SCHEMA_VERSION: u32 = 2;

/// `synPermMin` in the persisted schema; permanences never go below this.
pub const SYN_PERM_MIN: f64 = 0.0;
/// `synPermMax` in the persisted schema; permanences never go above this.
pub const SYN_PERM_MAX: f64 = 1.0;

/// Full persisted state of a [`SpatialPooler`], field-for-field with spec
/// §6's schema. Field order here is not normative (the schema only commits
/// to field *names*); this order groups dimensions, scalar configuration,
/// counters, and per-column arrays for readability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialPoolerState {
    pub version: u32,

    pub num_inputs: usize,
    pub num_columns: usize,
    pub input_dimensions: Vec<usize>,
    pub column_dimensions: Vec<usize>,

    pub potential_radius: usize,
    pub potential_pct: f64,
    pub global_inhibition: bool,
    pub local_area_density: f64,
    pub num_active_columns_per_inh_area: f64,
    pub stimulus_threshold: usize,
    pub syn_perm_inactive_dec: f64,
    pub syn_perm_active_inc: f64,
    pub syn_perm_connected: f64,
    pub syn_perm_min: f64,
    pub syn_perm_max: f64,
    pub syn_perm_trim_threshold: f64,
    pub syn_perm_below_stimulus_inc: f64,
    pub min_pct_overlap_duty_cycles: f64,
    pub min_pct_active_duty_cycles: f64,
    pub duty_cycle_period: u32,
    pub max_boost: f64,
    pub seed: i64,
    /// Absent in `version = 1` records; `load` defaults it to `true`.
    pub wrap_around: bool,
    pub sp_verbosity: u8,
    pub update_period: u32,

    pub inhibition_radius: usize,
    pub iteration_num: u64,
    pub iteration_learn_num: u64,

    /// Per column, sorted flat indices of `P(c)`.
    pub potential_pools: Vec<Vec<usize>>,
    /// Per column, `(index, value)` pairs for nonzero permanence entries.
    pub permanences: Vec<Vec<(usize, f64)>>,

    pub tie_breaker: Vec<f64>,
    pub overlap_duty_cycles: Vec<f64>,
    pub active_duty_cycles: Vec<f64>,
    pub min_overlap_duty_cycles: Vec<f64>,
    pub min_active_duty_cycles: Vec<f64>,
    pub boost_factors: Vec<f64>,
}

impl SpatialPoolerState {
    /// `version = 1` records predate the `wrap_around` field; everything
    /// else in the schema is unchanged between versions 1 and 2.
    fn migrate(mut self) -> Result<Self> {
        if self.version < 1 || self.version > SCHEMA_VERSION {
            return Err(SpError::Config(format!(
                "unsupported persisted-state version {}",
                self.version
            )));
        }
        if self.version == 1 {
            self.wrap_around = true;
        }
        Ok(self)
    }
}

impl SpatialPooler {
    /// Snapshot the full persisted state.
    pub fn to_state(&self) -> SpatialPoolerState {
        let num_columns = self.num_columns();
        let num_inputs = self.num_inputs();

        let mut potential_pools = Vec::with_capacity(num_columns);
        let mut permanences = Vec::with_capacity(num_columns);
        for c in 0..num_columns {
            potential_pools.push(self.synapses().potential(c).get_acts());
            let row = self.synapses().permanence(c);
            let sparse: Vec<(usize, f64)> = row
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != 0.0)
                .map(|(j, &v)| (j, v))
                .collect();
            permanences.push(sparse);
        }

        let config = self.config();
        SpatialPoolerState {
            version: SCHEMA_VERSION,
            num_inputs,
            num_columns,
            input_dimensions: config.input_dimensions.clone(),
            column_dimensions: config.column_dimensions.clone(),
            potential_radius: self.potential_radius(),
            potential_pct: config.potential_pct,
            global_inhibition: config.global_inhibition,
            local_area_density: config.local_area_density,
            num_active_columns_per_inh_area: config.num_active_columns_per_inh_area,
            stimulus_threshold: config.stimulus_threshold,
            syn_perm_inactive_dec: config.syn_perm_inactive_dec,
            syn_perm_active_inc: config.syn_perm_active_inc,
            syn_perm_connected: config.syn_perm_connected,
            syn_perm_min: SYN_PERM_MIN,
            syn_perm_max: SYN_PERM_MAX,
            syn_perm_trim_threshold: self.syn_perm_trim_threshold(),
            syn_perm_below_stimulus_inc: self.syn_perm_below_stimulus_inc(),
            min_pct_overlap_duty_cycles: config.min_pct_overlap_duty_cycles,
            min_pct_active_duty_cycles: config.min_pct_active_duty_cycles,
            duty_cycle_period: config.duty_cycle_period,
            max_boost: config.max_boost,
            seed: config.seed,
            wrap_around: config.wrap_around,
            sp_verbosity: config.sp_verbosity,
            update_period: config.update_period,
            inhibition_radius: self.inhibition_radius(),
            iteration_num: self.iteration_num(),
            iteration_learn_num: self.iteration_learn_num(),
            potential_pools,
            permanences,
            tie_breaker: self.tie_breaker().to_vec(),
            overlap_duty_cycles: self.overlap_duty().to_vec(),
            active_duty_cycles: self.active_duty().to_vec(),
            min_overlap_duty_cycles: self.min_overlap_duty().to_vec(),
            min_active_duty_cycles: self.min_active_duty().to_vec(),
            boost_factors: self.boost().to_vec(),
        }
    }

    /// Rebuild a `SpatialPooler` from a previously captured state, recomputing
    /// `connectedSynapses`/`connectedCount` by replaying the guarded update
    /// path (`raise = false`) over every stored permanence row.
    pub fn from_state(state: SpatialPoolerState) -> Result<Self> {
        let state = state.migrate()?;

        if state.potential_pools.len() != state.num_columns
            || state.permanences.len() != state.num_columns
        {
            return Err(SpError::Config(
                "persisted potential pool / permanence arrays do not match numColumns".into(),
            ));
        }

        let config = SpatialPoolerConfig {
            input_dimensions: state.input_dimensions.clone(),
            column_dimensions: state.column_dimensions.clone(),
            potential_radius: state.potential_radius,
            potential_pct: state.potential_pct,
            global_inhibition: state.global_inhibition,
            local_area_density: state.local_area_density,
            num_active_columns_per_inh_area: state.num_active_columns_per_inh_area,
            stimulus_threshold: state.stimulus_threshold,
            syn_perm_inactive_dec: state.syn_perm_inactive_dec,
            syn_perm_active_inc: state.syn_perm_active_inc,
            syn_perm_connected: state.syn_perm_connected,
            min_pct_overlap_duty_cycles: state.min_pct_overlap_duty_cycles,
            min_pct_active_duty_cycles: state.min_pct_active_duty_cycles,
            duty_cycle_period: state.duty_cycle_period,
            max_boost: state.max_boost,
            seed: state.seed,
            wrap_around: state.wrap_around,
            sp_verbosity: state.sp_verbosity,
            update_period: state.update_period,
        };
        config.validate()?;

        let columns = Topology::new(state.column_dimensions.clone())?;
        let inputs = Topology::new(state.input_dimensions.clone())?;
        if columns.size() != state.num_columns || inputs.size() != state.num_inputs {
            return Err(SpError::Config(
                "persisted numInputs/numColumns do not match the dimension vectors".into(),
            ));
        }

        let mut synapses = Synapses::new(state.num_columns, state.num_inputs);
        for c in 0..state.num_columns {
            let mut potential = BitField::new(state.num_inputs);
            potential.set_acts(&state.potential_pools[c]);
            synapses.set_potential(c, potential);

            let mut perm = vec![0.0f64; state.num_inputs];
            for &(j, v) in &state.permanences[c] {
                perm[j] = v;
            }
            synapses.update_column(
                c,
                perm,
                false,
                state.syn_perm_connected,
                state.syn_perm_trim_threshold,
                state.syn_perm_below_stimulus_inc,
                state.stimulus_threshold,
            )?;
        }

        let sp = SpatialPooler::from_parts(
            config,
            columns,
            inputs,
            synapses,
            state.tie_breaker,
            state.overlap_duty_cycles,
            state.active_duty_cycles,
            state.min_overlap_duty_cycles,
            state.min_active_duty_cycles,
            state.boost_factors,
            state.inhibition_radius,
            state.iteration_num,
            state.iteration_learn_num,
            state.syn_perm_trim_threshold,
            state.syn_perm_below_stimulus_inc,
        );

        log::debug!(
            "SpatialPooler restored from persisted state (schema version {}): {} columns over {} inputs",
            state.version,
            sp.num_columns(),
            sp.num_inputs()
        );

        Ok(sp)
    }

    /// Serialize to a pretty JSON string, for human-inspectable snapshots.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_state())?)
    }

    /// Deserialize from a JSON string produced by [`SpatialPooler::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let state: SpatialPoolerState = serde_json::from_str(json)?;
        Self::from_state(state)
    }

    /// Serialize to a compact binary form via `bincode`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let bytes = bincode::serialize(&self.to_state())?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Deserialize from the binary form written by [`SpatialPooler::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let state: SpatialPoolerState = bincode::deserialize(&bytes)?;
        Self::from_state(state)
    }
}
