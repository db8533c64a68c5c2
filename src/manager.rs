use crate::analysis::{Analyzer, RunComparison, save_results};
use crate::config::Config;
use crate::engine::{self, Engine};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let mut engine =
            Engine::new(self.cfg.clone(), run_idx).context("failed to construct engine")?;

        engine.run().context("failed to run simulation")?;
        engine.log_summary();

        engine
            .save_trajectory(self.trajectory_file(run_idx))
            .context("failed to save trajectory")?;

        Ok(())
    }

    pub fn analyze_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        let mut comparison = RunComparison::new();

        for run_idx in 0..n_runs {
            let trajectory_file = self.trajectory_file(run_idx);
            let records = engine::load_trajectory(&trajectory_file)
                .with_context(|| format!("failed to load {trajectory_file:?}"))?;

            let mut analyzer = Analyzer::new();
            analyzer.add_records(&records);
            let results = analyzer.results();
            for (name, report) in &results.metrics {
                log::info!("run {run_idx}: {name} = {report:?}");
            }
            comparison.add_run(&results);

            save_results(self.results_file(run_idx), &results)
                .context("failed to save results")?;
        }

        save_results(self.sim_dir.join("results.msgpack"), &comparison.report())
            .context("failed to save run comparison")?;

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let run_dir = self.run_dir(run_idx);
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        let results_file = self.sim_dir.join("results.msgpack");
        if results_file.exists() {
            fs::remove_file(&results_file)
                .with_context(|| format!("failed to remove {results_file:?}"))?;
        }

        Ok(())
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn trajectory_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trajectory.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }
}
