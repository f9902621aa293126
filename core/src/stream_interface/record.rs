use ndarray::{Array2, ArrayView1};

use crate::math::stats::StatsHelper;

/// Dedispersed output of one work call: one row per DM trial.
///
/// Column `t` of every row corresponds to stream sample `first_sample + t`.
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub first_sample: u64,
    pub dms: Vec<f64>,
    pub series: Array2<f32>,
}

impl OutputRecord {
    pub fn new(first_sample: u64, dms: Vec<f64>, series: Array2<f32>) -> Self {
        Self {
            first_sample,
            dms,
            series,
        }
    }

    /// Record with no produced samples.
    pub fn empty(first_sample: u64, dms: Vec<f64>) -> Self {
        let trials = dms.len();
        Self::new(first_sample, dms, Array2::zeros((trials, 0)))
    }

    pub fn num_trials(&self) -> usize {
        self.series.nrows()
    }

    /// Produced samples per trial.
    pub fn len(&self) -> usize {
        self.series.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.series.ncols() == 0
    }

    pub fn trial(&self, trial: usize) -> Option<ArrayView1<'_, f32>> {
        (trial < self.num_trials()).then(|| self.series.row(trial))
    }

    /// Column index and value of the strongest sample in one trial.
    pub fn peak(&self, trial: usize) -> Option<(usize, f32)> {
        let row = self.trial(trial)?.to_vec();
        StatsHelper::argmax(&row)
    }
}
