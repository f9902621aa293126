use ndarray::{s, Array2, ArrayView2};

/// Trailing spectra carried from one work call into the next.
///
/// Holds exactly `depth` rows; zero-filled at stream start.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: Array2<f32>,
}

impl HistoryBuffer {
    pub fn zeroed(depth: usize, channels: usize) -> Self {
        Self {
            samples: Array2::zeros((depth, channels)),
        }
    }

    pub fn depth(&self) -> usize {
        self.samples.nrows()
    }

    pub fn channels(&self) -> usize {
        self.samples.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }

    /// Keep the last `depth` rows of `window` as the next call's history.
    ///
    /// `window` must have at least `depth` rows and the same channel count.
    pub fn advance(&mut self, window: ArrayView2<'_, f32>) {
        let depth = self.depth();
        debug_assert!(window.nrows() >= depth);
        debug_assert_eq!(window.ncols(), self.channels());
        let tail = window.slice(s![window.nrows() - depth.., ..]);
        self.samples.assign(&tail);
    }

    pub fn reset(&mut self) {
        self.samples.fill(0.0);
    }
}
