//! Integration tests for the read/write accessor surface (spec §6): potential
//! pool and permanence get/set, connected-synapse views, and column-index
//! bounds checking.

use spatial_pooler::{BitField, SpError, SpatialPooler, SpatialPoolerConfig};

fn small_config() -> SpatialPoolerConfig {
    SpatialPoolerConfig {
        input_dimensions: vec![16],
        column_dimensions: vec![8],
        potential_radius: 4,
        potential_pct: 0.5,
        global_inhibition: true,
        local_area_density: 0.0,
        num_active_columns_per_inh_area: 2.0,
        stimulus_threshold: 1,
        seed: 11,
        ..SpatialPoolerConfig::default()
    }
}

#[test]
fn test_get_potential_round_trips_set_potential() {
    let mut sp = SpatialPooler::new(small_config()).unwrap();
    let mut pool = BitField::new(16);
    pool.set_acts(&[0, 2, 4, 6, 8]);
    sp.set_potential(0, &pool).unwrap();

    let mut out = BitField::new(16);
    sp.get_potential(0, &mut out).unwrap();
    assert_eq!(out.get_acts(), vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_set_potential_rejects_pool_below_stimulus_threshold() {
    let mut sp = SpatialPooler::new(small_config()).unwrap();
    let before = {
        let mut v = vec![0.0; 16];
        sp.get_permanence(0, &mut v).unwrap();
        v
    };

    let empty = BitField::new(16);
    let err = sp.set_potential(0, &empty).unwrap_err();
    assert!(matches!(err, SpError::Config(_)));

    let mut after = vec![0.0; 16];
    sp.get_permanence(0, &mut after).unwrap();
    assert_eq!(before, after, "failed set_potential must not mutate state");
}

#[test]
fn test_set_permanence_goes_through_guarded_path() {
    let mut sp = SpatialPooler::new(small_config()).unwrap();
    let mut pool = BitField::new(16);
    pool.set_acts(&[0, 1, 2, 3]);
    sp.set_potential(0, &pool).unwrap();

    let mut perm = vec![0.0; 16];
    perm[0] = 1.5; // out of range, must clamp to 1.0
    perm[1] = -0.3; // must clamp to 0.0
    perm[5] = 0.9; // outside potential pool, must be forced to 0
    sp.set_permanence(0, &perm).unwrap();

    let mut out = vec![0.0; 16];
    sp.get_permanence(0, &mut out).unwrap();
    assert_eq!(out[0], 1.0);
    assert_eq!(out[1], 0.0);
    assert_eq!(out[5], 0.0);
}

#[test]
fn test_connected_synapses_match_permanence_threshold() {
    let mut sp = SpatialPooler::new(small_config()).unwrap();
    let mut pool = BitField::new(16);
    pool.set_acts(&[0, 1, 2, 3, 4]);
    sp.set_potential(0, &pool).unwrap();

    let mut perm = vec![0.0; 16];
    perm[0] = sp.config().syn_perm_connected;
    perm[1] = sp.config().syn_perm_connected + 0.05;
    perm[2] = sp.config().syn_perm_connected - 0.02;
    sp.set_permanence(0, &perm).unwrap();

    let mut connected = BitField::new(16);
    sp.get_connected_synapses(0, &mut connected).unwrap();
    assert_eq!(connected.get_acts(), vec![0, 1]);

    let mut counts = vec![0u32; 8];
    sp.get_connected_counts(&mut counts).unwrap();
    assert_eq!(counts[0], 2);
}

#[test]
fn test_accessors_reject_out_of_range_column_index() {
    let sp = SpatialPooler::new(small_config()).unwrap();
    let mut out = BitField::new(16);
    let err = sp.get_potential(100, &mut out).unwrap_err();
    assert!(matches!(err, SpError::Index { index: 100, num_columns: 8 }));
}

#[test]
fn test_get_permanence_rejects_wrong_length_buffer() {
    let sp = SpatialPooler::new(small_config()).unwrap();
    let mut out = vec![0.0; 5];
    let err = sp.get_permanence(0, &mut out).unwrap_err();
    assert!(matches!(err, SpError::Shape { expected: 16, actual: 5 }));
}

#[test]
fn test_duty_cycle_and_boost_accessors_match_num_columns() {
    let sp = SpatialPooler::new(small_config()).unwrap();
    let mut overlap_duty = vec![0.0; 8];
    let mut active_duty = vec![0.0; 8];
    let mut boost = vec![0.0; 8];
    sp.get_overlap_duty_cycles(&mut overlap_duty).unwrap();
    sp.get_active_duty_cycles(&mut active_duty).unwrap();
    sp.get_boost_factors(&mut boost).unwrap();
    assert!(overlap_duty.iter().all(|&v| v == 0.0));
    assert!(active_duty.iter().all(|&v| v == 0.0));
    assert!(boost.iter().all(|&v| v == 1.0));
}

#[test]
fn test_set_boost_factors_round_trips() {
    let mut sp = SpatialPooler::new(small_config()).unwrap();
    let vals = vec![2.0; 8];
    sp.set_boost_factors(&vals).unwrap();
    let mut out = vec![0.0; 8];
    sp.get_boost_factors(&mut out).unwrap();
    assert_eq!(out, vals);
}

#[test]
fn test_strip_unlearned_columns_operation() {
    let sp = SpatialPooler::new(small_config()).unwrap();
    let all = (0..sp.num_columns()).collect::<Vec<_>>();
    // No learning has happened, so every column's active duty is 0.
    assert!(sp.strip_unlearned_columns(&all).is_empty());
}
