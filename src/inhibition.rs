//! Competitive inhibition: global top-K and local neighborhood winner
//! selection with deterministic tie-breaking.
//!
//! The overlap engine is responsible for zeroing columns below
//! `stimulus_threshold` before these functions ever see them; a zeroed
//! column can still win under local inhibition if every neighbor is also
//! zero; that is intentional, not a bug to guard against here.

use crate::topology::Topology;

/// Region-wide target density for this step.
///
/// Uses `local_area_density` directly when positive; otherwise derives a
/// density from `num_active_columns_per_inh_area` scaled by the local
/// neighborhood area (`(2*radius+1)^rank`, capped at `num_columns`).
pub fn compute_density(
    local_area_density: f64,
    num_active_columns_per_inh_area: f64,
    num_columns: usize,
    radius: usize,
    column_rank: usize,
) -> f64 {
    if local_area_density > 0.0 {
        local_area_density
    } else {
        let area = ((2 * radius + 1) as f64)
            .powi(column_rank as i32)
            .min(num_columns as f64);
        (num_active_columns_per_inh_area / area).min(0.5)
    }
}

/// Select winning columns given per-column (possibly boost-scaled) overlap
/// scores and a fixed per-instance tie-breaker.
///
/// Chooses global inhibition when `global_inhibition` is set or when
/// `radius` exceeds every column dimension; otherwise runs local
/// neighborhood inhibition with `wrap = false` regardless of the topology's
/// own wrap policy (local inhibition never wraps; only initialization does).
pub fn select_winners(
    scored: &[f64],
    tie_breaker: &[f64],
    columns: &Topology,
    radius: usize,
    global_inhibition: bool,
    density: f64,
) -> Vec<usize> {
    let nc = scored.len();
    debug_assert_eq!(nc, columns.size());
    debug_assert_eq!(nc, tie_breaker.len());

    let mut boosted: Vec<f64> = scored
        .iter()
        .zip(tie_breaker)
        .map(|(s, t)| s + t)
        .collect();

    let max_column_dim = *columns.dims().iter().max().unwrap();
    let use_global = global_inhibition || radius > max_column_dim;

    if use_global {
        select_global(&boosted, density)
    } else {
        select_local(&mut boosted, columns, radius, density)
    }
}

fn select_global(boosted: &[f64], density: f64) -> Vec<usize> {
    let nc = boosted.len();
    let k = (density * nc as f64).floor() as usize;

    let mut idx: Vec<usize> = (0..nc).collect();
    idx.sort_by(|&a, &b| {
        boosted[b]
            .partial_cmp(&boosted[a])
            .unwrap()
            .then(a.cmp(&b))
    });

    let mut winners: Vec<usize> = idx.into_iter().take(k).collect();
    winners.sort_unstable();
    winners
}

fn select_local(boosted: &mut [f64], columns: &Topology, radius: usize, density: f64) -> Vec<usize> {
    let nc = boosted.len();
    let overall_max = boosted.iter().cloned().fold(f64::MIN, f64::max);
    let bump = overall_max / 1000.0;

    let mut winners = Vec::new();
    for c in 0..nc {
        let neighbors = columns.neighbors(c, radius, false);
        let num_active = (0.5 + density * (neighbors.len() + 1) as f64).floor() as usize;
        let num_bigger = neighbors.iter().filter(|&&n| boosted[n] > boosted[c]).count();

        if num_bigger < num_active {
            winners.push(c);
            // Commit the win immediately so later columns in this pass see
            // an already-won neighbor.
            boosted[c] += bump;
        }
    }
    winners
}
