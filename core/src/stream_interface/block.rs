use ndarray::{Array2, ArrayView2};

/// A chunk of spectra as delivered by a host, one row per time step.
#[derive(Debug, Clone)]
pub struct SpectrogramBlock {
    /// Absolute stream index of row 0.
    pub first_sample: u64,
    pub samples: Array2<f32>,
}

impl SpectrogramBlock {
    pub fn new(first_sample: u64, samples: Array2<f32>) -> Self {
        Self {
            first_sample,
            samples,
        }
    }

    pub fn rows(&self) -> usize {
        self.samples.nrows()
    }

    pub fn channels(&self) -> usize {
        self.samples.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }
}
