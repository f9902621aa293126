use std::ops::Range;

use ndarray::{Array2, ArrayView1};

use crate::math::delay::{delay_seconds, delay_to_samples};
use crate::math::frequency::ChannelFrequencyMap;
use crate::prelude::{DedispResult, DedispersionConfig};
use crate::telemetry::log::LogManager;

/// Per-trial, per-channel sample shifts for one configuration.
///
/// Only sub-band channels are stored; column `k` holds channel
/// `sub_band.start + k`. Immutable once built.
#[derive(Debug, Clone)]
pub struct TrialShiftTable {
    shifts: Array2<usize>,
    dms: Vec<f64>,
    sub_band: Range<usize>,
    frequencies: ChannelFrequencyMap,
    reference_mhz: f64,
    max_shift: usize,
    source: DedispersionConfig,
}

impl TrialShiftTable {
    pub fn build(config: &DedispersionConfig) -> DedispResult<Self> {
        config.validate()?;

        let frequencies = ChannelFrequencyMap::new(config);
        let reference_mhz = frequencies.reference_mhz(config.reference);
        let sub_band = config.sub_band();
        let dms: Vec<f64> = (0..config.num_dms)
            .map(|trial| config.dm_for_trial(trial))
            .collect();

        let mut shifts = Array2::zeros((config.num_dms, sub_band.len()));
        for (mut row, &dm) in shifts.outer_iter_mut().zip(&dms) {
            for (slot, channel) in row.iter_mut().zip(sub_band.clone()) {
                // Validated above: every channel frequency is positive.
                let f_channel = frequencies.frequencies()[channel];
                let delay = delay_seconds(dm, f_channel, reference_mhz);
                *slot = delay_to_samples(delay, config.t_int);
            }
        }
        let max_shift = shifts.iter().copied().max().unwrap_or(0);

        LogManager::new("trial-table").record(&format!(
            "{} trials x {} channels, reference {:.4} MHz, max shift {} samples",
            dms.len(),
            sub_band.len(),
            reference_mhz,
            max_shift
        ));

        Ok(Self {
            shifts,
            dms,
            sub_band,
            frequencies,
            reference_mhz,
            max_shift,
            source: config.clone(),
        })
    }

    /// True when `config` yields this exact table. `samples_per_call` only
    /// affects scheduling and is ignored.
    pub fn describes(&self, config: &DedispersionConfig) -> bool {
        let built = &self.source;
        built.vec_length == config.vec_length
            && built.num_dms == config.num_dms
            && built.f_obs == config.f_obs
            && built.bandwidth == config.bandwidth
            && built.t_int == config.t_int
            && built.sub_band() == config.sub_band()
            && built.dm_step == config.dm_step
            && built.reference == config.reference
            && built.channel_order == config.channel_order
    }

    /// Shift of `channel` under `trial`; `None` outside the sub-band.
    pub fn shift(&self, trial: usize, channel: usize) -> Option<usize> {
        if !self.sub_band.contains(&channel) {
            return None;
        }
        self.shifts
            .get((trial, channel - self.sub_band.start))
            .copied()
    }

    /// Shifts of every sub-band channel, ascending channel index.
    pub fn trial_shifts(&self, trial: usize) -> ArrayView1<'_, usize> {
        self.shifts.row(trial)
    }

    pub fn max_shift(&self) -> usize {
        self.max_shift
    }

    pub fn num_dms(&self) -> usize {
        self.dms.len()
    }

    pub fn dm(&self, trial: usize) -> Option<f64> {
        self.dms.get(trial).copied()
    }

    pub fn dms(&self) -> &[f64] {
        &self.dms
    }

    pub fn sub_band(&self) -> Range<usize> {
        self.sub_band.clone()
    }

    /// Channels summed per trial.
    pub fn channel_count(&self) -> usize {
        self.sub_band.len()
    }

    /// Total channels per spectrum, including those outside the sub-band.
    pub fn vec_length(&self) -> usize {
        self.frequencies.len()
    }

    pub fn reference_mhz(&self) -> f64 {
        self.reference_mhz
    }

    pub fn frequencies(&self) -> &ChannelFrequencyMap {
        &self.frequencies
    }
}
