//! Summary statistics of simulation metrics.
//!
//! Equilibration and blocking only make sense for stationary metrics.
//! Trends (cumulative counts, running bests) are summarized as a whole.

use serde::{Deserialize, Serialize};

/// Running mean and variance (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals - 1) as f64).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Metric recorded once per tick.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    vals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    /// Value at the last tick.
    pub last: f64,
    /// Mean over the equilibrated part of the series.
    pub mean: f64,
    pub std_dev: f64,
    /// Standard error of the mean (undefined for trends).
    pub sem: f64,
    /// Whether the series only moves in one direction.
    pub is_trend: bool,
    /// Whether an equilibration point was found before the middle of the series.
    pub is_equil: bool,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, val: f64) {
        self.vals.push(val);
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn report(&self) -> TimeSeriesReport {
        let last = self.vals.last().copied().unwrap_or(f64::NAN);
        if is_trend(&self.vals) {
            return TimeSeriesReport {
                last,
                mean: compute_mean(&self.vals),
                std_dev: compute_var(&self.vals).sqrt(),
                sem: f64::NAN,
                is_trend: true,
                is_equil: false,
            };
        }

        let i_equil = compute_opt_i_equil(&self.vals);
        let equil = &self.vals[i_equil..];
        TimeSeriesReport {
            last,
            mean: compute_mean(equil),
            std_dev: compute_var(equil).sqrt(),
            sem: compute_sem(equil),
            is_trend: false,
            is_equil: i_equil < self.vals.len() / 2,
        }
    }
}

/// Whether a series is monotone without being constant.
pub fn is_trend(vals: &[f64]) -> bool {
    let (Some(first), Some(last)) = (vals.first(), vals.last()) else {
        return false;
    };
    let rising = vals.windows(2).all(|pair| pair[0] <= pair[1]);
    let falling = vals.windows(2).all(|pair| pair[0] >= pair[1]);
    (rising || falling) && first != last
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

pub fn compute_var(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

/// Standard error of the mean of a correlated series (Flyvbjerg-Petersen blocking).
pub fn compute_sem(vals: &[f64]) -> f64 {
    let mut blocks = vals.to_vec();
    let mut sem2_ests = Vec::new();
    let mut sem2_errs = Vec::new();

    while blocks.len() >= 2 {
        let n_blocks = blocks.len() as f64;
        let sem2_est = compute_var(&blocks) / n_blocks;
        sem2_ests.push(sem2_est);
        sem2_errs.push(sem2_est * (2.0 / (n_blocks - 1.0)).sqrt());

        blocks = blocks
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect();
    }

    // First blocking level whose estimate exceeds every later lower bound.
    for (idx, &sem2_est) in sem2_ests.iter().enumerate() {
        let max_low = sem2_ests[idx..]
            .iter()
            .zip(&sem2_errs[idx..])
            .map(|(est, err)| est - err)
            .fold(f64::NEG_INFINITY, f64::max);
        if sem2_est > max_low {
            return sem2_est.sqrt();
        }
    }

    sem2_ests.last().copied().unwrap_or(f64::NAN).sqrt()
}

/// Start of the equilibrated part of a series (marginal standard error rule).
///
/// Candidates are `n >> k` for decreasing `k`; short series start at 0.
pub fn compute_opt_i_equil(vals: &[f64]) -> usize {
    let n_vals = vals.len();
    if n_vals < 4 {
        return 0;
    }

    let marginal_error = |start: usize| {
        let tail = &vals[start..];
        let n_tail = tail.len() as f64;
        compute_var(tail) * (n_tail - 1.0) / (n_tail * n_tail)
    };

    (1..=n_vals.ilog2() + 1)
        .rev()
        .map(|shift| n_vals >> shift)
        .map(|start| (start, marginal_error(start)))
        .fold((n_vals / 2, f64::INFINITY), |best, cand| {
            if cand.1 < best.1 { cand } else { best }
        })
        .0
}
