//! `spatial_pooler` - online, unsupervised learning of sparse distributed
//! representations (SDRs) over a population of competitive columns.
//!
//! This is the Hierarchical Temporal Memory spatial pooler: it transforms
//! an arbitrary binary input vector into a fixed-sparsity binary activation
//! over a set of "columns," such that semantically similar inputs yield
//! overlapping SDRs and, over time, columns specialize on distinct input
//! patterns while participation spreads roughly uniformly (via boosting).
//!
//! # Architecture
//!
//! - [`BitField`] - bit-packed storage for inputs, potential pools, and
//!   connected-synapse masks.
//! - [`topology`] - N-dimensional coordinate mapping and neighborhood
//!   enumeration, shared between column space and input space.
//! - [`synapses`] - per-column potential pool, dense permanence row, and
//!   the derived connected-synapse mask, behind one guarded update path.
//! - [`inhibition`] - global top-K and local neighborhood winner selection.
//! - [`config`] - validated construction-time configuration.
//! - [`persistence`] - the persisted-state schema and `save`/`load`/
//!   `to_json`/`from_json` round trips.
//! - [`SpatialPooler`] - the step controller tying all of the above
//!   together into one `compute` call per step.
//!
//! # Example
//!
//! ```
//! use spatial_pooler::{BitField, SpatialPooler, SpatialPoolerConfig};
//!
//! let config = SpatialPoolerConfig {
//!     input_dimensions: vec![32],
//!     column_dimensions: vec![16],
//!     potential_radius: 8,
//!     global_inhibition: true,
//!     num_active_columns_per_inh_area: 4.0,
//!     local_area_density: 0.0,
//!     seed: 1,
//!     ..SpatialPoolerConfig::default()
//! };
//! let mut sp = SpatialPooler::new(config).unwrap();
//!
//! let mut input = BitField::new(32);
//! input.set_acts(&[1, 5, 9, 20]);
//! let mut out = BitField::new(16);
//! sp.compute(&input, true, &mut out).unwrap();
//! assert_eq!(out.num_set(), 4);
//! ```

pub mod bitfield;
pub mod config;
pub mod error;
pub mod inhibition;
pub mod persistence;
pub mod spatial_pooler;
pub mod synapses;
pub mod topology;
pub mod utils;

pub use bitfield::{bitfield_copy_words, BitField, Word, BITS_PER_WORD};
pub use config::SpatialPoolerConfig;
pub use error::{Result, SpError};
pub use persistence::SpatialPoolerState;
pub use spatial_pooler::SpatialPooler;
pub use synapses::Synapses;
pub use topology::Topology;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
