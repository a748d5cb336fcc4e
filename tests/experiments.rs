//! Integration tests for the experiment harness.

use bb84_sim::config::{DEFAULT_UNDETECTED_NOISE, default_disclosure_grid, default_noise_grid};
use bb84_sim::experiments::{Metric, mismatch_rows, sweep_mismatch, sweep_undetected_probability};
use bb84_sim::{ChannelScenario, SessionConfig, StandardErrorConvention, SweepConfig, simulate};

fn small_sweep(repetitions: usize) -> SweepConfig {
    SweepConfig {
        base_seed: 1,
        qubit_count: 120,
        repetitions,
        ..SweepConfig::default()
    }
}

#[test]
fn mean_is_arithmetic_mean_of_runs() {
    let sweep = small_sweep(6);
    let scenario = ChannelScenario::new(false, true, false);
    let rows = mismatch_rows(scenario, &sweep, &[0.3]).unwrap();
    let table = sweep_mismatch(scenario, &sweep, &[0.3]).unwrap();

    let expected = rows.iter().map(|r| r.global_mismatch_ratio).sum::<f64>() / rows.len() as f64;
    let ci = table.interval(0.3, Metric::GlobalMismatch).unwrap();
    assert!((ci.mean - expected).abs() < 1e-12);
    assert_eq!(table.rows[0].repetitions, 6);
}

#[test]
fn rows_replay_through_the_simulator() {
    let sweep = small_sweep(3);
    let scenario = ChannelScenario::new(true, false, true);
    let rows = mismatch_rows(scenario, &sweep, &[0.0, 0.4]).unwrap();

    for row in &rows {
        let record = simulate(
            &SessionConfig::new(sweep.qubit_count)
                .with_scenario(scenario)
                .with_noise_probability(row.parameter)
                .with_seed(row.seed),
        )
        .unwrap();
        assert_eq!(record.global_mismatch_ratio, row.global_mismatch_ratio);
        assert_eq!(record.eavesdropper_detected, row.eavesdropper_detected);
    }
}

#[test]
fn sweeps_are_reproducible() {
    let sweep = small_sweep(4);
    let scenario = ChannelScenario::new(false, true, true);
    let grid = [0.0, 0.5, 1.0];
    assert_eq!(
        sweep_mismatch(scenario, &sweep, &grid).unwrap(),
        sweep_mismatch(scenario, &sweep, &grid).unwrap()
    );
}

#[test]
fn ideal_sweep_has_zero_width_nowhere_negative() {
    let table =
        sweep_mismatch(ChannelScenario::default(), &small_sweep(5), &default_noise_grid()).unwrap();
    assert_eq!(table.rows.len(), 11);
    for row in &table.rows {
        for ci in &row.intervals {
            assert!(ci.upper_offset >= 0.0);
            assert!(ci.lower_offset <= 0.0);
            assert_eq!(ci.lower_offset, -ci.upper_offset);
        }
    }
}

#[test]
fn half_width_shrinks_with_more_repetitions() {
    let scenario = ChannelScenario::new(false, true, false);
    let width = |reps: usize| {
        sweep_mismatch(scenario, &small_sweep(reps), &[0.5])
            .unwrap()
            .interval(0.5, Metric::GlobalMismatch)
            .unwrap()
            .half_width()
    };
    let few = width(4);
    let many = width(64);
    assert!(many < few, "few={} many={}", few, many);
}

#[test]
fn parameter_group_convention_ignores_repetition_count() {
    let scenario = ChannelScenario::new(false, false, true);
    let grid = [0.2, 0.8];
    let sweep = SweepConfig {
        standard_error: StandardErrorConvention::ParameterGroups,
        ..small_sweep(9)
    };
    let by_groups = sweep_mismatch(scenario, &sweep, &grid).unwrap();
    let by_reps = sweep_mismatch(
        scenario,
        &SweepConfig {
            standard_error: StandardErrorConvention::Repetitions,
            ..sweep.clone()
        },
        &grid,
    )
    .unwrap();

    let g = by_groups.interval(0.8, Metric::XMismatch).unwrap();
    let r = by_reps.interval(0.8, Metric::XMismatch).unwrap();
    assert_eq!(g.mean, r.mean);
    // sqrt(9) / sqrt(2)
    assert!((g.half_width() / r.half_width() - 3.0 / 2.0_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn disclosing_more_key_makes_evasion_rarer() {
    let table = sweep_undetected_probability(
        ChannelScenario::new(true, false, false),
        &small_sweep(30),
        DEFAULT_UNDETECTED_NOISE,
        &default_disclosure_grid(),
    )
    .unwrap();

    assert_eq!(table.parameter_name, "k");
    let at = |k: f64| table.interval(k, Metric::Undetected).unwrap().mean;
    // About 60 sifted bits, so even 10% disclosure exposes a few bits.
    assert!(at(0.1) > at(1.0));
    assert_eq!(at(1.0), 0.0);
    assert!(table.to_delimited().starts_with("k;undetected_mean;undetected_lower;undetected_upper\n"));
}

#[test]
fn noisy_link_hides_eavesdropper_more_often_than_clean_link() {
    let sweep = small_sweep(40);
    let grid = [0.2];
    let evasion = |scenario| {
        sweep_undetected_probability(scenario, &sweep, 0.5, &grid)
            .unwrap()
            .interval(0.2, Metric::Undetected)
            .unwrap()
            .mean
    };
    let clean = evasion(ChannelScenario::new(true, false, false));
    let noisy = evasion(ChannelScenario::new(true, true, true));
    assert!(noisy > clean, "clean={} noisy={}", clean, noisy);
}

#[test]
fn sweep_config_deserializes_with_defaults() {
    let sweep: SweepConfig =
        serde_json::from_str(r#"{ "repetitions": 12, "standard_error": "parameter_groups" }"#).unwrap();
    assert_eq!(sweep.repetitions, 12);
    assert_eq!(sweep.qubit_count, 300);
    assert_eq!(sweep.alpha, 0.01);
    assert_eq!(sweep.standard_error, StandardErrorConvention::ParameterGroups);

    let session: SessionConfig =
        serde_json::from_str(r#"{ "qubit_count": 50, "eavesdropping": true, "seed": 4 }"#).unwrap();
    assert_eq!(session.qubit_count, 50);
    assert!(session.eavesdropping);
    assert_eq!(session.noise_probability, 0.0);
}
