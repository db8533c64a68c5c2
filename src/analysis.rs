use crate::stats::{Accumulator, AccumulatorReport, TimeSeries, TimeSeriesReport};
use crate::types::Record;
use anyhow::{Context, Result};
use rmp_serde::encode;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Summary of every metric of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub n_records: usize,
    pub metrics: BTreeMap<String, TimeSeriesReport>,
}

/// Builds the time series of every metric found in a trajectory.
#[derive(Default)]
pub struct Analyzer {
    n_records: usize,
    series: BTreeMap<String, TimeSeries>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_records(&mut self, records: &[Record]) {
        for record in records {
            for (name, val) in record.snapshot.metrics() {
                self.series.entry(name.to_string()).or_default().push(val);
            }
            self.n_records += 1;
        }
    }

    pub fn results(&self) -> RunResults {
        let metrics = self
            .series
            .iter()
            .map(|(name, series)| (name.clone(), series.report()))
            .collect();
        RunResults {
            n_records: self.n_records,
            metrics,
        }
    }
}

/// Statistics of the final metric values over all runs.
#[derive(Default)]
pub struct RunComparison {
    finals: BTreeMap<String, Accumulator>,
}

impl RunComparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_run(&mut self, results: &RunResults) {
        for (name, report) in &results.metrics {
            self.finals.entry(name.clone()).or_default().add(report.last);
        }
    }

    pub fn report(&self) -> BTreeMap<String, AccumulatorReport> {
        self.finals
            .iter()
            .map(|(name, acc)| (name.clone(), acc.report()))
            .collect()
    }
}

/// Serialize any result to a MessagePack file.
pub fn save_results<P: AsRef<Path>, T: Serialize>(file: P, results: &T) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, results).context("failed to serialize results")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
