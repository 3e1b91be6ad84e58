//! Synapse store: per-column potential pool, permanence row, and the derived
//! connected-synapse mask and count.
//!
//! Every permanence write funnels through [`Synapses::update_column`], the
//! single writer for the permanence/connected/count triple (the "guarded
//! update" path). No other code may mutate a column's permanence row
//! directly.

use crate::bitfield::BitField;
use crate::error::{Result, SpError};

/// Owns the potential pool, permanence row, connected mask, and connected
/// count for every column.
///
/// The potential pool is frozen once `set_potential` is called during
/// initialization; everything else changes only through `update_column`.
#[derive(Clone, Debug)]
pub struct Synapses {
    num_inputs: usize,
    potential: Vec<BitField>,
    permanence: Vec<Vec<f64>>,
    connected: Vec<BitField>,
    connected_count: Vec<u32>,
}

impl Synapses {
    /// Allocate storage for `num_columns` columns over `num_inputs` input
    /// bits. Potential pools are empty until `set_potential` is called.
    pub fn new(num_columns: usize, num_inputs: usize) -> Self {
        Self {
            num_inputs,
            potential: vec![BitField::new(num_inputs); num_columns],
            permanence: vec![vec![0.0; num_inputs]; num_columns],
            connected: vec![BitField::new(num_inputs); num_columns],
            connected_count: vec![0; num_columns],
        }
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.potential.len()
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Freeze column `c`'s potential pool. Only valid before any permanence
    /// has been written for that column; called once by the initializer.
    pub fn set_potential(&mut self, c: usize, potential: BitField) {
        self.potential[c] = potential;
    }

    #[inline]
    pub fn potential(&self, c: usize) -> &BitField {
        &self.potential[c]
    }

    #[inline]
    pub fn permanence(&self, c: usize) -> &[f64] {
        &self.permanence[c]
    }

    #[inline]
    pub fn connected(&self, c: usize) -> &BitField {
        &self.connected[c]
    }

    #[inline]
    pub fn connected_count(&self, c: usize) -> u32 {
        self.connected_count[c]
    }

    /// The guarded permanence update path (component C). `perm` is the full
    /// dense proposed row (width `num_inputs`); entries outside column `c`'s
    /// potential pool are forced to zero regardless of what `perm` contains
    /// for them.
    ///
    /// When `raise` is set, first raises permanences of potential-pool
    /// members until at least `stimulus_threshold` of them are (strictly)
    /// above `syn_perm_connected`; fails with [`SpError::Config`] if the
    /// potential pool itself is smaller than `stimulus_threshold` (raising
    /// could never succeed).
    pub fn update_column(
        &mut self,
        c: usize,
        mut perm: Vec<f64>,
        raise: bool,
        syn_perm_connected: f64,
        syn_perm_trim_threshold: f64,
        syn_perm_below_stimulus_inc: f64,
        stimulus_threshold: usize,
    ) -> Result<()> {
        debug_assert_eq!(perm.len(), self.num_inputs);

        if raise {
            raise_to_threshold(
                &mut perm,
                &self.potential[c],
                syn_perm_connected,
                syn_perm_below_stimulus_inc,
                stimulus_threshold,
            )?;
        }

        let potential = &self.potential[c];
        let mut connected = BitField::new(self.num_inputs);
        let mut count = 0u32;

        for j in 0..self.num_inputs {
            if potential.get_bit(j) == 0 {
                perm[j] = 0.0;
                continue;
            }
            if perm[j] > 0.0 && perm[j] < syn_perm_trim_threshold {
                perm[j] = 0.0;
            }
            perm[j] = perm[j].clamp(0.0, 1.0);
            if perm[j] >= syn_perm_connected {
                connected.set_bit(j);
                count += 1;
            }
        }

        self.permanence[c] = perm;
        self.connected[c] = connected;
        self.connected_count[c] = count;
        Ok(())
    }

    /// Memory footprint estimate, matching the corpus's `memory_usage`
    /// convention on per-component state.
    pub fn memory_usage(&self) -> usize {
        let perm_bytes: usize = self
            .permanence
            .iter()
            .map(|row| row.len() * std::mem::size_of::<f64>())
            .sum();
        let potential_bytes: usize = self.potential.iter().map(|b| b.memory_usage()).sum();
        let connected_bytes: usize = self.connected.iter().map(|b| b.memory_usage()).sum();
        let count_bytes = self.connected_count.len() * std::mem::size_of::<u32>();
        perm_bytes + potential_bytes + connected_bytes + count_bytes
    }
}

/// `raiseToThreshold`: while fewer than `stimulus_threshold` potential-pool
/// members have permanence strictly above `syn_perm_connected`, add
/// `inc` to every potential-pool member's permanence and clamp into
/// `[0, 1]`. Note the asymmetry with `update_column`'s final connected-set
/// computation, which uses `>=`; this loop's guard uses `>`. Both are
/// preserved exactly as specified, since swapping either breaks
/// bit-identical reproduction of the reference behavior.
fn raise_to_threshold(
    perm: &mut [f64],
    potential: &BitField,
    syn_perm_connected: f64,
    inc: f64,
    stimulus_threshold: usize,
) -> Result<()> {
    let members = potential.get_acts();
    if members.len() < stimulus_threshold {
        return Err(SpError::Config(format!(
            "potential pool size {} is smaller than stimulusThreshold {}",
            members.len(),
            stimulus_threshold
        )));
    }

    loop {
        let num_connected = members
            .iter()
            .filter(|&&j| perm[j] > syn_perm_connected)
            .count();
        if num_connected >= stimulus_threshold {
            break;
        }
        for &j in &members {
            perm[j] = (perm[j] + inc).min(1.0);
        }
    }

    Ok(())
}
