use bioswarm::aco::ant::PHEROMONE_STRENGTH;
use bioswarm::aco::{AcoParams, AcoSchedule, AntDrone, AntSwarm, Cell, DisasterZone, GridPos};
use bioswarm::config::AcoConfig;
use bioswarm::swarm::Swarm;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::collections::HashMap;

#[test]
fn drone_on_survivor_rescues_it() {
    let mut zone = DisasterZone::new(5, 5);
    let pos = GridPos::new(2, 2);
    zone.place_survivor(pos);
    assert_eq!(zone.total_survivors(), 1);

    let mut drone = AntDrone::new(0, pos);
    drone.check_cell_content(&mut zone);

    assert_eq!(zone.cell(pos), Some(Cell::Free));
    assert_eq!(zone.survivors_found(), 1);
    assert_eq!(drone.survivors_found(), 1);
    assert!((zone.pheromone(pos) - PHEROMONE_STRENGTH * 5.0).abs() < 1e-12);

    // The survivor is only rescued once.
    drone.check_cell_content(&mut zone);
    assert_eq!(zone.survivors_found(), 1);
    assert!((zone.pheromone(pos) - PHEROMONE_STRENGTH * 5.0).abs() < 1e-12);
}

#[test]
fn drone_on_resource_collects_it() {
    let mut zone = DisasterZone::new(5, 5);
    let pos = GridPos::new(1, 3);
    zone.set_cell(pos, Cell::Resource);

    let mut drone = AntDrone::new(0, pos);
    drone.check_cell_content(&mut zone);

    assert_eq!(zone.cell(pos), Some(Cell::Free));
    assert_eq!(zone.survivors_found(), 0);
    assert_eq!(drone.resources_found(), 1);
    assert!((zone.pheromone(pos) - PHEROMONE_STRENGTH * 3.0).abs() < 1e-12);
}

#[test]
fn pheromone_evaporates_and_ignores_out_of_range_deposits() {
    let mut zone = DisasterZone::new(3, 3);
    let pos = GridPos::new(1, 1);
    zone.deposit_pheromone(pos, 10.0);
    zone.deposit_pheromone(GridPos::new(-1, 0), 10.0);
    zone.deposit_pheromone(GridPos::new(3, 0), 10.0);

    zone.evaporate(0.1);

    assert!((zone.pheromone(pos) - 9.0).abs() < 1e-12);
    let total: f64 = zone.pheromone_grid().iter().sum();
    assert!((total - 9.0).abs() < 1e-12);
}

#[test]
fn coverage_counts_visited_accessible_cells() {
    let mut zone = DisasterZone::new(2, 2);
    zone.set_cell(GridPos::new(0, 0), Cell::Obstacle);
    zone.mark_visited(GridPos::new(1, 1));

    assert!((zone.coverage() - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn percentile_interpolates_linearly() {
    let mut zone = DisasterZone::new(4, 1);
    for x in 0..4 {
        zone.deposit_pheromone(GridPos::new(x, 0), (x + 1) as f64);
    }

    assert!((zone.pheromone_percentile(80.0) - 3.4).abs() < 1e-12);
    assert!((zone.pheromone_percentile(0.0) - 1.0).abs() < 1e-12);
    assert!((zone.pheromone_percentile(100.0) - 4.0).abs() < 1e-12);
}

#[test]
fn dynamic_obstacles_only_cover_free_cells() {
    let mut rng = ChaCha12Rng::seed_from_u64(1);
    let mut zone = DisasterZone::new(10, 10);
    for x in 0..10 {
        zone.place_survivor(GridPos::new(x, 5));
    }

    for _ in 0..20 {
        zone.add_dynamic_obstacle(&mut rng);
    }

    let survivors = zone.grid().iter().filter(|&&c| c == Cell::Survivor).count();
    assert_eq!(survivors, 10);
    assert!(zone.grid().contains(&Cell::Obstacle));
}

#[test]
fn targeted_drone_steps_along_longer_axis() {
    let mut rng = ChaCha12Rng::seed_from_u64(2);
    let mut zone = DisasterZone::new(10, 10);
    let params = AcoParams::default();

    let mut drone = AntDrone::new(0, GridPos::new(0, 0));
    let target = GridPos::new(3, 1);
    drone.set_target(target);

    let expected = [
        GridPos::new(1, 0),
        GridPos::new(2, 0),
        GridPos::new(2, 1),
        GridPos::new(3, 1),
    ];
    for pos in expected {
        drone.step(&mut zone, &params, &mut rng).unwrap();
        assert_eq!(drone.pos(), pos);
        assert!(zone.is_visited(pos));
    }

    assert_eq!(drone.target(), None);
    assert_eq!(drone.energy_consumed(), 4);
}

#[test]
fn blocked_targeted_drone_takes_closest_detour() {
    let mut rng = ChaCha12Rng::seed_from_u64(3);
    let mut zone = DisasterZone::new(10, 10);
    zone.set_cell(GridPos::new(1, 0), Cell::Obstacle);
    let params = AcoParams::default();

    let mut drone = AntDrone::new(0, GridPos::new(0, 0));
    drone.set_target(GridPos::new(3, 0));
    drone.step(&mut zone, &params, &mut rng).unwrap();

    assert_eq!(drone.pos(), GridPos::new(1, 1));
    assert_eq!(drone.target(), Some(GridPos::new(3, 0)));
}

#[test]
fn walled_in_drone_stays_put() {
    let mut rng = ChaCha12Rng::seed_from_u64(4);
    let mut zone = DisasterZone::new(3, 3);
    for x in 0..3 {
        for y in 0..3 {
            if (x, y) != (1, 1) {
                zone.set_cell(GridPos::new(x, y), Cell::Obstacle);
            }
        }
    }

    let mut drone = AntDrone::new(0, GridPos::new(1, 1));
    drone.step(&mut zone, &AcoParams::default(), &mut rng).unwrap();

    assert_eq!(drone.pos(), GridPos::new(1, 1));
    assert_eq!(drone.energy_consumed(), 0);
}

#[test]
fn without_pheromone_bias_choice_follows_heuristic() {
    let mut rng = ChaCha12Rng::seed_from_u64(5);
    let mut zone = DisasterZone::new(3, 3);
    let center = GridPos::new(1, 1);
    let unvisited = GridPos::new(0, 0);
    let resource = GridPos::new(2, 2);

    for x in 0..3 {
        for y in 0..3 {
            let pos = GridPos::new(x, y);
            if pos != unvisited {
                zone.mark_visited(pos);
            }
        }
    }
    zone.set_cell(resource, Cell::Resource);
    zone.deposit_pheromone(GridPos::new(0, 2), 100.0);

    let params = AcoParams {
        alpha: 0.0,
        beta: 1.0,
        exploration_factor: 0.0,
    };
    let drone = AntDrone::new(0, center);

    let n_trials = 20_000;
    let mut counts: HashMap<GridPos, usize> = HashMap::new();
    for _ in 0..n_trials {
        let pos = drone.choose_neighbor(&zone, &params, &mut rng).unwrap().unwrap();
        *counts.entry(pos).or_default() += 1;
    }

    // Heuristics: 2 for the unvisited cell, 3 for the resource, 1 elsewhere.
    let freq = |pos: GridPos| counts.get(&pos).copied().unwrap_or(0) as f64 / n_trials as f64;
    assert!((freq(unvisited) - 2.0 / 11.0).abs() < 0.02);
    assert!((freq(resource) - 3.0 / 11.0).abs() < 0.02);
    assert!((freq(GridPos::new(0, 2)) - 1.0 / 11.0).abs() < 0.02);
}

#[test]
fn idle_drones_get_hot_targets() {
    let mut rng = ChaCha12Rng::seed_from_u64(6);
    let mut zone = DisasterZone::new(5, 5);
    let hot: Vec<GridPos> = (0..5)
        .map(|x| GridPos::new(x, 4))
        .chain([GridPos::new(0, 3)])
        .collect();
    for &pos in &hot {
        zone.deposit_pheromone(pos, 10.0);
    }

    let drones = (0..3).map(|id| AntDrone::new(id, GridPos::new(2, 2))).collect();
    let mut swarm = AntSwarm::new(zone, drones, AcoParams::default(), AcoSchedule::default());
    swarm.assign_targets(&mut rng);

    for drone in swarm.drones() {
        let target = drone.target().expect("drone should have a target");
        assert!(hot.contains(&target));
    }
}

#[test]
fn zone_fields_evolve_monotonically() {
    let mut rng = ChaCha12Rng::seed_from_u64(7);
    let cfg = AcoConfig::default();
    let mut swarm = AntSwarm::generate(&cfg, &mut rng).unwrap();
    let total_survivors = swarm.zone().total_survivors();

    for _ in 0..cfg.n_steps {
        swarm.step(&mut rng).unwrap();
        if swarm.is_finished() {
            break;
        }
    }

    for pair in swarm.history().windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        for (was, is) in prev.visited.iter().zip(&cur.visited) {
            assert!(!was || *is);
        }
        for (was, is) in prev.grid.iter().zip(&cur.grid) {
            if *was == Cell::Obstacle {
                assert_eq!(*is, Cell::Obstacle);
            }
        }
        assert!(cur.pheromone.iter().all(|&p| p >= 0.0));

        let remaining = cur.grid.iter().filter(|&&c| c == Cell::Survivor).count();
        assert_eq!(remaining + cur.metrics.survivors_found, total_survivors);
        assert!(cur.metrics.survivors_found >= prev.metrics.survivors_found);
    }
}

#[test]
fn search_stops_when_no_survivor_is_left() {
    let zone = DisasterZone::new(4, 4);
    let drones = vec![AntDrone::new(0, GridPos::new(0, 0))];
    let swarm = AntSwarm::new(zone, drones, AcoParams::default(), AcoSchedule::default());

    assert!(swarm.is_finished());
}

#[test]
fn debris_and_targets_follow_their_schedules() {
    let mut rng = ChaCha12Rng::seed_from_u64(8);
    let zone = DisasterZone::new(30, 30);
    let drones = (0..4)
        .map(|id| AntDrone::new(id, GridPos::new(5 + 5 * id as i32, 15)))
        .collect();
    let mut swarm = AntSwarm::new(zone, drones, AcoParams::default(), AcoSchedule::default());

    let mut target_ticks = Vec::new();
    for _ in 0..60 {
        let tick = swarm.tick();
        let idle: Vec<bool> = swarm.drones().iter().map(|d| d.target().is_none()).collect();
        swarm.step(&mut rng).unwrap();

        let assigned = swarm
            .drones()
            .iter()
            .zip(&idle)
            .any(|(drone, &was_idle)| was_idle && drone.target().is_some());
        if assigned {
            target_ticks.push(tick);
        }
    }

    let n_obstacles = |grid: &[Cell]| grid.iter().filter(|&&c| c == Cell::Obstacle).count();
    let debris_ticks: Vec<usize> = swarm
        .history()
        .windows(2)
        .filter(|pair| n_obstacles(&pair[1].grid[..]) != n_obstacles(&pair[0].grid[..]))
        .map(|pair| pair[0].tick)
        .collect();

    assert!(debris_ticks.contains(&10));
    assert!(debris_ticks.iter().all(|&t| t % 20 == 10));

    assert!(target_ticks.contains(&15));
    assert!(target_ticks.iter().all(|&t| t > 0 && t % 15 == 0));
}
