use std::ops::Range;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::stream_interface::OutputRecord;

/// Which frequency the dispersion delay of every channel is measured against.
///
/// Channels at or above the reference get zero delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFrequency {
    /// Centre of the highest-frequency channel.
    #[default]
    HighestChannel,
    /// Upper edge of the band, `f_obs + bandwidth / 2`.
    TopEdge,
    /// Band centre, `f_obs`.
    Center,
}

/// Mapping from channel index to frequency across the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOrder {
    /// Channel 0 is the lowest frequency.
    #[default]
    Ascending,
    /// Channel 0 is the highest frequency (flipped band).
    Descending,
}

/// Construction parameters of a dedispersion block.
///
/// Frequencies are in MHz, `t_int` in seconds and `dm_step` in pc cm^-3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedispersionConfig {
    pub vec_length: usize,
    pub num_dms: usize,
    pub f_obs: f64,
    pub bandwidth: f64,
    pub t_int: f64,
    pub samples_per_call: usize,
    pub sub_band_start: usize,
    pub sub_band_end: usize,
    pub dm_step: f64,
    #[serde(default)]
    pub reference: ReferenceFrequency,
    #[serde(default)]
    pub channel_order: ChannelOrder,
}

impl Default for DedispersionConfig {
    fn default() -> Self {
        Self {
            vec_length: 256,
            num_dms: 64,
            f_obs: 1400.0,
            bandwidth: 100.0,
            t_int: 0.001,
            samples_per_call: 1024,
            sub_band_start: 0,
            sub_band_end: 256,
            dm_step: 1.0,
            reference: ReferenceFrequency::default(),
            channel_order: ChannelOrder::default(),
        }
    }
}

impl DedispersionConfig {
    pub fn with_reference(mut self, reference: ReferenceFrequency) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_channel_order(mut self, channel_order: ChannelOrder) -> Self {
        self.channel_order = channel_order;
        self
    }

    pub fn with_sub_band(mut self, start: usize, end: usize) -> Self {
        self.sub_band_start = start;
        self.sub_band_end = end;
        self
    }

    /// Channels that take part in the summation.
    pub fn sub_band(&self) -> Range<usize> {
        self.sub_band_start..self.sub_band_end
    }

    pub fn dm_for_trial(&self, trial: usize) -> f64 {
        trial as f64 * self.dm_step
    }

    /// Checks every construction parameter. Called before any table is built.
    pub fn validate(&self) -> DedispResult<()> {
        if self.vec_length == 0 {
            return Err(invalid("vec_length must be positive"));
        }
        if self.num_dms == 0 {
            return Err(invalid("num_dms must be positive"));
        }
        if self.samples_per_call == 0 {
            return Err(invalid("samples_per_call must be positive"));
        }
        for (name, value) in [
            ("f_obs", self.f_obs),
            ("bandwidth", self.bandwidth),
            ("t_int", self.t_int),
            ("dm_step", self.dm_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DedispError::InvalidConfiguration(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if self.sub_band_start >= self.sub_band_end {
            return Err(DedispError::InvalidConfiguration(format!(
                "sub-band [{}, {}) selects no channels",
                self.sub_band_start, self.sub_band_end
            )));
        }
        if self.sub_band_end > self.vec_length {
            return Err(DedispError::InvalidConfiguration(format!(
                "sub-band end {} exceeds channel count {}",
                self.sub_band_end, self.vec_length
            )));
        }
        let bottom_edge = self.f_obs - self.bandwidth / 2.0;
        if bottom_edge <= 0.0 {
            return Err(DedispError::InvalidConfiguration(format!(
                "band bottom edge {:.3} MHz is not a positive frequency",
                bottom_edge
            )));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> DedispError {
    DedispError::InvalidConfiguration(message.to_string())
}

/// Result of one host scheduling cycle.
#[derive(Debug, Clone)]
pub struct WorkOutput {
    pub consumed: usize,
    pub produced: usize,
    pub records: OutputRecord,
}

/// Common error type for the dedispersion core.
#[derive(thiserror::Error, Debug)]
pub enum DedispError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The window handed to the engine did not carry `max_shift` samples of
    /// look-back. Adapter/engine contract violation; never expected at runtime.
    #[error("insufficient history: {required} samples required, {available} available")]
    InsufficientHistory { required: usize, available: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type DedispResult<T> = Result<T, DedispError>;

/// Capability a pull-based streaming host drives once per scheduling cycle.
pub trait StreamBlock {
    /// Input samples needed before `noutput_items` outputs can be produced.
    fn forecast(&self, noutput_items: usize) -> usize;

    /// Run one cycle over the host's unconsumed, time-major input.
    fn general_work(
        &mut self,
        noutput_items: usize,
        input: ArrayView2<'_, f32>,
    ) -> DedispResult<WorkOutput>;

    /// Return to the stream-start state.
    fn reset(&mut self);
}
