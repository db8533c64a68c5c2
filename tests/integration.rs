use std::{fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_bioswarm"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn basic_workflow(name: &str, config_contents: &str) {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create", "--n-runs", "2"]);

    assert!(test_dir.join("run-0000/trajectory.msgpack").is_file());
    assert!(test_dir.join("run-0001/trajectory.msgpack").is_file());
    assert!(test_dir.join("run-0002/trajectory.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    assert!(test_dir.join("run-0000/results.msgpack").is_file());
    assert!(test_dir.join("results.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "clean"]);

    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("results.msgpack").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn abc_workflow() {
    let config_contents = String::new()
        + "seed = 7\n"
        + "\n"
        + "[swarm]\n"
        + "kind = \"abc\"\n"
        + "n_workers = 4\n"
        + "n_observers = 2\n"
        + "n_scouts = 2\n"
        + "n_flowers = 20\n"
        + "n_steps = 64\n"
        + "\n"
        + "[output]\n"
        + "steps_per_log = 16\n";
    basic_workflow("abc_workflow", &config_contents);
}

#[test]
fn aco_workflow() {
    let config_contents = String::new()
        + "seed = 11\n"
        + "\n"
        + "[swarm]\n"
        + "kind = \"aco\"\n"
        + "n_drones = 6\n"
        + "width = 20\n"
        + "height = 20\n"
        + "n_debris = 10\n"
        + "n_survivors = 5\n"
        + "n_steps = 80\n";
    basic_workflow("aco_workflow", &config_contents);
}

#[test]
fn pso_workflow() {
    let config_contents = String::new()
        + "[swarm]\n"
        + "kind = \"pso\"\n"
        + "n_drones = 10\n"
        + "n_steps = 40\n"
        + "formation = \"star\"\n"
        + "fault_tolerance = true\n";
    basic_workflow("pso_workflow", &config_contents);
}
