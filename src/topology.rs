//! N-dimensional topology: coordinate mapping and neighborhood enumeration.
//!
//! Both column space and input space are instances of the same `Topology`
//! type; the initializer and the inhibition/homeostasis code share one
//! implementation instead of the source's separate 1D/2D/ND helpers.

use crate::error::{Result, SpError};

/// A row-major N-dimensional index space.
///
/// Flat indices are the canonical identity everywhere else in the crate;
/// `Topology` is only consulted when coordinates are actually needed (center
/// mapping, neighbor enumeration, span statistics).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    dims: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl Topology {
    /// Build a topology from per-dimension sizes. Every dimension must be
    /// non-zero and at least one dimension must be given.
    pub fn new(dims: Vec<usize>) -> Result<Self> {
        if dims.is_empty() {
            return Err(SpError::Config("dimensions must be non-empty".into()));
        }
        if dims.iter().any(|&d| d == 0) {
            return Err(SpError::Config("dimensions must all be non-zero".into()));
        }

        let rank = dims.len();
        let mut strides = vec![1usize; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * dims[d + 1];
        }
        let size = dims.iter().product();

        Ok(Self { dims, strides, size })
    }

    /// Per-dimension sizes.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of flat indices (`Ni` or `Nc`).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unravel a flat index into per-dimension coordinates.
    pub fn coords(&self, idx: usize) -> Vec<usize> {
        debug_assert!(idx < self.size, "index out of range for this topology");
        let mut rem = idx;
        let mut out = vec![0usize; self.rank()];
        for d in 0..self.rank() {
            out[d] = rem / self.strides[d];
            rem %= self.strides[d];
        }
        out
    }

    /// Ravel per-dimension coordinates into a flat index. Coordinates are
    /// assumed to already be in range; callers that compute coordinates via
    /// arithmetic (not enumeration) are responsible for clamping/wrapping
    /// first.
    pub fn index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.rank());
        coords
            .iter()
            .zip(&self.strides)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Map a column index to the flat index of the input bit at the center
    /// of its receptive field. `self` is the column topology, `inputs` is
    /// the input topology; both must have equal rank.
    pub fn map_column_center(&self, c: usize, inputs: &Topology) -> Result<usize> {
        if self.rank() != inputs.rank() {
            return Err(SpError::Config(
                "inputDimensions and columnDimensions must have equal rank".into(),
            ));
        }

        let x = self.coords(c);
        let mut y = vec![0usize; self.rank()];
        for d in 0..self.rank() {
            let ratio = inputs.dims[d] as f64 / self.dims[d] as f64;
            y[d] = ((x[d] as f64) * ratio + 0.5 * ratio).floor() as usize;
            if y[d] >= inputs.dims[d] {
                y[d] = inputs.dims[d] - 1;
            }
        }
        Ok(inputs.index(&y))
    }

    /// Enumerate the flat indices of the N-dim hyper-cube of side
    /// `2*radius+1` centered on `idx`, excluding `idx` itself.
    ///
    /// With `wrap`, each per-dimension range wraps modulo that dimension's
    /// size and duplicate coordinates (which occur when `2*radius+1 >=
    /// dims[d]`) are collapsed. Without `wrap`, each per-dimension range is
    /// clipped to `[0, dims[d])`.
    ///
    /// The returned order is deterministic (row-major over the per-dimension
    /// coordinate lists) so that tie-breaking built on top of it is
    /// reproducible, but it is not otherwise meaningful.
    pub fn neighbors(&self, idx: usize, radius: usize, wrap: bool) -> Vec<usize> {
        let center = self.coords(idx);
        let rank = self.rank();
        let mut per_dim: Vec<Vec<usize>> = Vec::with_capacity(rank);

        for d in 0..rank {
            let dim = self.dims[d] as isize;
            let c = center[d] as isize;
            let r = radius as isize;
            let mut vals: Vec<usize> = Vec::new();

            if wrap {
                let mut seen = vec![false; self.dims[d]];
                for off in -r..=r {
                    let v = (c + off).rem_euclid(dim) as usize;
                    if !seen[v] {
                        seen[v] = true;
                        vals.push(v);
                    }
                }
                vals.sort_unstable();
            } else {
                let lo = (c - r).max(0);
                let hi = (c + r).min(dim - 1);
                if lo <= hi {
                    vals.extend((lo..=hi).map(|v| v as usize));
                }
            }

            per_dim.push(vals);
        }

        let mut out = Vec::new();
        let mut combo = vec![0usize; rank];
        cartesian_product(&per_dim, 0, &mut combo, &mut |c| {
            let flat = self.index(c);
            if flat != idx {
                out.push(flat);
            }
        });
        out
    }
}

fn cartesian_product(
    per_dim: &[Vec<usize>],
    d: usize,
    combo: &mut Vec<usize>,
    visit: &mut impl FnMut(&[usize]),
) {
    if d == per_dim.len() {
        visit(combo);
        return;
    }
    for &v in &per_dim[d] {
        combo[d] = v;
        cartesian_product(per_dim, d + 1, combo, visit);
    }
}

/// Mean over dimensions of `columnDims[d] / inputDims[d]`, padding the
/// shorter rank with 1s (used by the inhibition-radius recompute).
pub fn avg_columns_per_input(column_dims: &[usize], input_dims: &[usize]) -> f64 {
    let rank = column_dims.len().max(input_dims.len());
    let mut sum = 0.0;
    for d in 0..rank {
        let c = *column_dims.get(d).unwrap_or(&1) as f64;
        let i = *input_dims.get(d).unwrap_or(&1) as f64;
        sum += c / i;
    }
    sum / rank as f64
}

/// Mean, over input dimensions, of the span (`max - min + 1`) of a column's
/// connected input coordinates in that dimension; `0.0` if the column has no
/// connected synapses.
pub fn avg_connected_span_for_column(connected: &[usize], inputs: &Topology) -> f64 {
    if connected.is_empty() {
        return 0.0;
    }

    let rank = inputs.rank();
    let mut min_d = vec![usize::MAX; rank];
    let mut max_d = vec![0usize; rank];

    for &j in connected {
        let coord = inputs.coords(j);
        for d in 0..rank {
            min_d[d] = min_d[d].min(coord[d]);
            max_d[d] = max_d[d].max(coord[d]);
        }
    }

    let sum: usize = (0..rank).map(|d| max_d[d] - min_d[d] + 1).sum();
    sum as f64 / rank as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_roundtrip() {
        let t = Topology::new(vec![4, 5, 6]).unwrap();
        for idx in 0..t.size() {
            let c = t.coords(idx);
            assert_eq!(t.index(&c), idx);
        }
    }

    #[test]
    fn test_map_column_center_1d() {
        let cols = Topology::new(vec![5]).unwrap();
        let inputs = Topology::new(vec![10]).unwrap();
        // ratio = 2.0; y = floor(x*2 + 1.0)
        let expected = [1, 3, 5, 7, 9];
        for c in 0..5 {
            assert_eq!(cols.map_column_center(c, &inputs).unwrap(), expected[c]);
        }
    }

    #[test]
    fn test_map_column_center_requires_equal_rank() {
        let cols = Topology::new(vec![5, 5]).unwrap();
        let inputs = Topology::new(vec![10]).unwrap();
        assert!(cols.map_column_center(0, &inputs).is_err());
    }

    #[test]
    fn test_neighbors_no_wrap_clips() {
        let t = Topology::new(vec![5]).unwrap();
        let n = t.neighbors(0, 1, false);
        assert_eq!(n, vec![1]);

        let n = t.neighbors(4, 1, false);
        assert_eq!(n, vec![3]);
    }

    #[test]
    fn test_neighbors_wrap_dedupes() {
        let t = Topology::new(vec![4]).unwrap();
        // radius 2 on a dim of size 4 wraps all the way around
        let n = t.neighbors(0, 2, true);
        let mut sorted = n.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), n.len(), "neighbors must already be deduped");
        assert!(!n.contains(&0));
    }

    #[test]
    fn test_neighbors_2d_excludes_center() {
        let t = Topology::new(vec![3, 3]).unwrap();
        let n = t.neighbors(4, 1, false); // center of 3x3 grid
        assert_eq!(n.len(), 8);
        assert!(!n.contains(&4));
    }

    #[test]
    fn test_avg_columns_per_input() {
        assert_eq!(avg_columns_per_input(&[64, 64], &[32, 32]), 2.0);
        assert_eq!(avg_columns_per_input(&[10], &[5]), 2.0);
    }

    #[test]
    fn test_avg_connected_span_empty() {
        let inputs = Topology::new(vec![10, 10]).unwrap();
        assert_eq!(avg_connected_span_for_column(&[], &inputs), 0.0);
    }

    #[test]
    fn test_avg_connected_span_single_point() {
        let inputs = Topology::new(vec![10, 10]).unwrap();
        let connected = vec![inputs.index(&[3, 3])];
        assert_eq!(avg_connected_span_for_column(&connected, &inputs), 1.0);
    }
}
