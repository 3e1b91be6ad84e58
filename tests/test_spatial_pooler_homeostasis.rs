//! Integration tests for homeostatic feedback (spec §4.H): duty cycle EMA,
//! weak-column bumping, boost factors, and inhibition-radius recomputation.

use spatial_pooler::{BitField, SpatialPooler, SpatialPoolerConfig};

fn local_config(update_period: u32) -> SpatialPoolerConfig {
    SpatialPoolerConfig {
        input_dimensions: vec![20],
        column_dimensions: vec![10],
        potential_radius: 5,
        potential_pct: 0.6,
        global_inhibition: false,
        local_area_density: 0.0,
        num_active_columns_per_inh_area: 2.0,
        seed: 5,
        update_period,
        ..SpatialPoolerConfig::default()
    }
}

#[test]
fn test_first_learning_step_duty_cycle_equals_indicator() {
    // With period = min(dutyCyclePeriod, n) and n == 1 after the first
    // learning step, duty = ((period-1)*duty + v) / period = v exactly.
    let mut sp = SpatialPooler::new(local_config(50)).unwrap();
    let mut input = BitField::new(20);
    input.set_all();
    let mut out = BitField::new(10);
    sp.compute(&input, true, &mut out).unwrap();

    let winners = out.get_acts();
    let mut active_duty = vec![0.0; 10];
    sp.get_active_duty_cycles(&mut active_duty).unwrap();
    for c in 0..10 {
        let expected = if winners.contains(&c) { 1.0 } else { 0.0 };
        assert!((active_duty[c] - expected).abs() < 1e-12);
    }
}

#[test]
fn test_overlap_duty_cycle_tracks_nonzero_overlap() {
    let mut sp = SpatialPooler::new(local_config(50)).unwrap();
    let mut input = BitField::new(20);
    input.set_all();
    let mut out = BitField::new(10);
    sp.compute(&input, true, &mut out).unwrap();

    let mut overlap_duty = vec![0.0; 10];
    sp.get_overlap_duty_cycles(&mut overlap_duty).unwrap();
    // All-ones input means every column with any connected synapse has
    // nonzero overlap; at minimum the sum of overlap duty cycles is > 0.
    assert!(overlap_duty.iter().sum::<f64>() > 0.0);
}

#[test]
fn test_inhibition_radius_recomputed_only_on_update_period_tick() {
    let mut sp = SpatialPooler::new(local_config(5)).unwrap();
    let mut input = BitField::new(20);
    input.set_all();
    let mut out = BitField::new(10);

    let initial_radius = sp.inhibition_radius();
    for i in 1..5 {
        sp.compute(&input, true, &mut out).unwrap();
        assert_eq!(
            sp.inhibition_radius(),
            initial_radius,
            "radius must not change before the update_period tick (step {i})"
        );
    }
    // Fifth learning step hits the update_period tick; radius may or may not
    // change in value, but the recompute path must have run without error.
    sp.compute(&input, true, &mut out).unwrap();
}

#[test]
fn test_boost_factors_stay_at_one_when_active_duty_exceeds_floor() {
    // With a trivially low min_pct_active_duty_cycles, a column that wins
    // on every step should keep boost == 1 (active_duty > minActiveDuty).
    let cfg = SpatialPoolerConfig {
        min_pct_active_duty_cycles: 0.001,
        ..local_config(5)
    };
    let mut sp = SpatialPooler::new(cfg).unwrap();
    let mut input = BitField::new(20);
    input.set_all();
    let mut out = BitField::new(10);

    for _ in 0..20 {
        sp.compute(&input, true, &mut out).unwrap();
    }

    let winners = out.get_acts();
    let mut boost = vec![0.0; 10];
    sp.get_boost_factors(&mut boost).unwrap();
    for &w in &winners {
        assert!((boost[w] - 1.0).abs() < 1e-6, "boost[{w}] = {}", boost[w]);
    }
}

#[test]
fn test_boost_factors_stay_within_configured_envelope() {
    let cfg = SpatialPoolerConfig {
        max_boost: 5.0,
        ..local_config(5)
    };
    let mut sp = SpatialPooler::new(cfg).unwrap();
    let mut input = BitField::new(20);
    let mut out = BitField::new(10);
    // Sparse, shifting inputs so some columns go cold and boost climbs.
    let patterns: [&[usize]; 4] = [&[0, 1, 2], &[5, 6], &[10, 11, 12, 13], &[18, 19]];
    for round in 0..40 {
        let acts = patterns[round % patterns.len()];
        input.clear_all();
        input.set_acts(acts);
        sp.compute(&input, true, &mut out).unwrap();
    }

    let mut boost = vec![0.0; 10];
    sp.get_boost_factors(&mut boost).unwrap();
    for &b in &boost {
        assert!(b >= 1.0 - 1e-6 && b <= 5.0 + 1e-3, "boost {b} outside [1, 5]");
    }
}

#[test]
fn test_weak_column_bump_does_not_error_under_sustained_low_activity() {
    // A column whose potential pool never overlaps the input should get
    // repeatedly bumped without the guarded update path ever failing.
    let cfg = SpatialPoolerConfig {
        min_pct_overlap_duty_cycles: 0.5,
        update_period: 3,
        ..local_config(3)
    };
    let mut sp = SpatialPooler::new(cfg).unwrap();
    let mut input = BitField::new(20);
    input.set_acts(&[0, 1]);
    let mut out = BitField::new(10);
    for _ in 0..30 {
        sp.compute(&input, true, &mut out).unwrap();
    }
    // Reaching here without a propagated ConfigError is the assertion.
}
