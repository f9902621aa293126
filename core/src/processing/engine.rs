use std::sync::Arc;

use ndarray::{s, Array2, ArrayView2, Zip};

use crate::prelude::{DedispError, DedispResult};
use crate::processing::trial_table::TrialShiftTable;

/// Incoherent shift-and-sum over every DM trial.
#[derive(Debug, Clone)]
pub struct DedispersionEngine {
    table: Arc<TrialShiftTable>,
}

impl DedispersionEngine {
    pub fn new(table: Arc<TrialShiftTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TrialShiftTable {
        &self.table
    }

    /// Dedisperse a time-major `(time, channel)` window whose first `history`
    /// rows are look-back.
    ///
    /// Returns `(num_dms, rows - history)`, where
    /// `out[i][t] = sum_c window[t + history - shift[i][c]][c]` over the
    /// sub-band, accumulated in ascending channel order.
    pub fn dedisperse(
        &self,
        window: ArrayView2<'_, f32>,
        history: usize,
    ) -> DedispResult<Array2<f32>> {
        let table = &self.table;
        if history < table.max_shift() {
            return Err(DedispError::InsufficientHistory {
                required: table.max_shift(),
                available: history,
            });
        }
        if window.ncols() != table.vec_length() {
            return Err(DedispError::InvalidInput(format!(
                "window has {} channels, expected {}",
                window.ncols(),
                table.vec_length()
            )));
        }
        if window.nrows() < history {
            return Err(DedispError::InvalidInput(format!(
                "window of {} rows cannot hold {} history rows",
                window.nrows(),
                history
            )));
        }

        let produced = window.nrows() - history;
        let sub_band = table.sub_band();
        let mut output = Array2::<f32>::zeros((table.num_dms(), produced));

        for (trial, mut out_row) in output.outer_iter_mut().enumerate() {
            let shifts = table.trial_shifts(trial);
            for (&shift, channel) in shifts.iter().zip(sub_band.clone()) {
                let start = history - shift;
                let column = window.slice(s![start..start + produced, channel]);
                Zip::from(&mut out_row)
                    .and(&column)
                    .for_each(|acc, &sample| *acc += sample);
            }
        }

        Ok(output)
    }
}
