use bioswarm::analysis::{Analyzer, RunComparison};
use bioswarm::config::{Config, SwarmConfig};
use bioswarm::engine::{Engine, Simulation, load_trajectory};
use bioswarm::pso::FormationKind;
use bioswarm::stats::{
    Accumulator, TimeSeries, compute_mean, compute_opt_i_equil, compute_var, is_trend,
};
use bioswarm::swarm::Swarm;
use bioswarm::types::Snapshot;
use std::{fs, path::PathBuf};

#[test]
fn accumulator_matches_direct_formulas() {
    let vals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let mut acc = Accumulator::new();
    for &val in &vals {
        acc.add(val);
    }

    let report = acc.report();
    assert_eq!(report.n_vals, 8);
    assert!((report.mean - 5.0).abs() < 1e-12);
    assert!((report.mean - compute_mean(&vals)).abs() < 1e-12);
    assert!((report.std_dev - compute_var(&vals).sqrt()).abs() < 1e-12);
    assert!((report.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
}

#[test]
fn empty_statistics_are_undefined() {
    let report = Accumulator::new().report();
    assert_eq!(report.n_vals, 0);
    assert!(report.mean.is_nan());
    assert!(report.std_dev.is_nan());

    let series = TimeSeries::new();
    assert!(series.is_empty());
    assert!(series.report().last.is_nan());
}

#[test]
fn constant_series_has_no_spread() {
    let mut series = TimeSeries::new();
    for _ in 0..16 {
        series.push(2.5);
    }

    let report = series.report();
    assert_eq!(series.len(), 16);
    assert_eq!(report.last, 2.5);
    assert_eq!(report.mean, 2.5);
    assert_eq!(report.std_dev, 0.0);
    assert_eq!(report.sem, 0.0);
    assert!(report.is_equil);
}

#[test]
fn trends_are_summarized_without_equilibration() {
    let mut series = TimeSeries::new();
    for i in 0..32 {
        series.push(i as f64);
    }

    let report = series.report();
    assert!(report.is_trend);
    assert!(!report.is_equil);
    assert_eq!(report.last, 31.0);
    assert_eq!(report.mean, 15.5);
    assert!(report.sem.is_nan());

    assert!(is_trend(&[3.0, 2.0, 2.0, 1.0]));
    assert!(!is_trend(&[1.0, 1.0, 1.0]));
    assert!(!is_trend(&[0.0, 1.0, 0.0, 1.0]));
    assert!(!is_trend(&[]));
}

#[test]
fn equilibration_skips_the_transient() {
    let vals: Vec<f64> = (0..64)
        .map(|i| if i < 16 { 100.0 - i as f64 } else { (i % 2) as f64 })
        .collect();

    let i_equil = compute_opt_i_equil(&vals);
    assert!(i_equil >= 16);
    assert!(i_equil < 32);
    assert_eq!(compute_opt_i_equil(&vals[..3]), 0);
}

#[test]
fn analyzer_reports_every_metric() {
    let cfg = Config::from_toml(
        "seed = 3\n\
         [swarm]\n\
         kind = \"pso\"\n\
         n_drones = 6\n\
         n_steps = 12\n",
    )
    .unwrap();
    let mut engine = Engine::new(cfg, 0).unwrap();
    engine.run().unwrap();

    let file = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("analyzer_trajectory.msgpack");
    engine.save_trajectory(&file).unwrap();
    let records = load_trajectory(&file).unwrap();
    fs::remove_file(&file).ok();

    let Simulation::Pso(swarm) = engine.simulation() else {
        panic!("expected a particle swarm");
    };
    assert_eq!(records.len(), swarm.history().len());
    for (i, (record, snapshot)) in records.iter().zip(swarm.history()).enumerate() {
        assert_eq!(record.step, i);
        assert_eq!(record.snapshot, Snapshot::Pso(snapshot.clone()));
    }

    let mut analyzer = Analyzer::new();
    analyzer.add_records(&records);
    let results = analyzer.results();

    assert_eq!(results.n_records, 13);
    assert!(results.metrics.contains_key("active_drones"));
    assert!(results.metrics.contains_key("best_fitness"));
    assert_eq!(results.metrics["active_drones"].last, 5.0);
    assert!(results.metrics["active_drones"].is_trend);
    assert!(!results.metrics["active_drones"].is_equil);

    let mut comparison = RunComparison::new();
    comparison.add_run(&results);
    comparison.add_run(&results);
    let report = comparison.report();
    assert_eq!(report["active_drones"].n_vals, 2);
    assert_eq!(report["active_drones"].mean, 5.0);
}

#[test]
fn minimal_config_uses_defaults() {
    let cfg = Config::from_toml("[swarm]\nkind = \"abc\"\n").unwrap();

    assert_eq!(cfg.seed, None);
    assert_eq!(cfg.output.steps_per_log, 20);
    let SwarmConfig::Abc(abc) = &cfg.swarm else {
        panic!("expected a bee colony config");
    };
    assert_eq!(abc.n_workers, 8);
    assert_eq!(abc.n_observers, 4);
    assert_eq!(abc.n_scouts, 3);
    assert_eq!(abc.n_flowers, 50);
    assert_eq!(abc.n_steps, 200);
    assert_eq!(cfg.swarm.n_steps(), 200);

    let cfg = Config::from_toml("[swarm]\nkind = \"pso\"\nformation = \"robot\"\n").unwrap();
    let SwarmConfig::Pso(pso) = &cfg.swarm else {
        panic!("expected a particle swarm config");
    };
    assert_eq!(pso.formation, FormationKind::Robot);
    assert!(pso.fault_tolerance);
}

#[test]
fn invalid_configs_are_rejected() {
    let bad = [
        "[swarm]\nkind = \"abc\"\ngreenhouse_size = 2.0\n",
        "[swarm]\nkind = \"aco\"\nexploration_factor = 1.5\n",
        "[swarm]\nkind = \"aco\"\nwidth = 3\nheight = 3\nn_survivors = 10\n",
        "[swarm]\nkind = \"pso\"\nformation = \"square\"\n",
        "[swarm]\nkind = \"bat\"\n",
        "[swarm]\nkind = \"pso\"\n[output]\nsteps_per_log = 0\n",
        "seed = 1\n",
    ];
    for contents in bad {
        assert!(Config::from_toml(contents).is_err(), "accepted:\n{contents}");
    }
}
