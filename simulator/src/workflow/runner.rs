use crate::workflow::config::WorkflowConfig;
use anyhow::{ensure, Context};
use dedispcore::math::StatsHelper;
use dedispcore::prelude::StreamBlock;
use dedispcore::processing::StreamingAdapter;
use dedispcore::stream_interface::SpectrogramBlock;
use log::{debug, info};
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

/// Strongest sample of one dedispersed trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    pub trial: usize,
    pub dm: f64,
    pub peak: f32,
    pub peak_sample: u64,
    pub snr: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub trials: Vec<TrialSummary>,
    pub best_trial: Option<usize>,
    pub max_shift: usize,
    pub samples_produced: usize,
    pub work_calls: usize,
    pub starved_calls: usize,
    #[serde(skip)]
    pub series: Array2<f32>,
}

impl WorkflowResult {
    pub fn best(&self) -> Option<&TrialSummary> {
        self.best_trial.and_then(|idx| self.trials.get(idx))
    }
}

/// Emulates a pull-based host: spectra arrive in irregular chunks, each
/// scheduling cycle asks the adapter for `samples_per_call` outputs, and
/// consumed rows are dropped from the pending queue.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, spectrogram: ArrayView2<'_, f32>) -> anyhow::Result<WorkflowResult> {
        let stream = &self.config.stream;
        ensure!(
            stream.chunk_min >= 1 && stream.chunk_min <= stream.chunk_max,
            "chunk range {}..={} is empty",
            stream.chunk_min,
            stream.chunk_max
        );

        let mut adapter = StreamingAdapter::new(self.config.dedispersion.clone())
            .context("building dedispersion adapter")?;
        let request = self.config.dedispersion.samples_per_call;
        let channels = spectrogram.ncols();
        let num_dms = adapter.table().num_dms();
        info!(
            "streaming {} spectra through {} trials (max shift {})",
            spectrogram.nrows(),
            num_dms,
            adapter.max_shift()
        );

        let mut rng = StdRng::seed_from_u64(stream.seed);
        let mut pending = Array2::<f32>::zeros((0, channels));
        let mut series = Array2::<f32>::zeros((num_dms, 0));
        let mut cursor = 0;

        while cursor < spectrogram.nrows() {
            let chunk = rng.gen_range(stream.chunk_min..=stream.chunk_max);
            let end = (cursor + chunk).min(spectrogram.nrows());
            let block = SpectrogramBlock::new(
                cursor as u64,
                spectrogram.slice(s![cursor..end, ..]).to_owned(),
            );
            pending = concatenate(Axis(0), &[pending.view(), block.view()])
                .context("queueing host chunk")?;
            cursor = end;
            debug!(
                "host delivered {} spectra from sample {}, {} pending, forecast {}",
                block.rows(),
                block.first_sample,
                pending.nrows(),
                adapter.forecast(request)
            );

            // Keep serving while the queue can satisfy a full request.
            loop {
                let out = adapter
                    .general_work(request, pending.view())
                    .context("running dedispersion work call")?;
                if out.produced == 0 {
                    break;
                }
                series = concatenate(Axis(1), &[series.view(), out.records.series.view()])
                    .context("collecting trial output")?;
                pending = pending.slice(s![out.consumed.., ..]).to_owned();
            }
        }

        // End of stream: hand over whatever is left.
        while pending.nrows() > 0 {
            let out = adapter
                .general_work(pending.nrows(), pending.view())
                .context("draining dedispersion adapter")?;
            ensure!(out.produced > 0, "adapter stalled while draining");
            series = concatenate(Axis(1), &[series.view(), out.records.series.view()])
                .context("collecting trial output")?;
            pending = pending.slice(s![out.consumed.., ..]).to_owned();
        }

        let trials: Vec<TrialSummary> = adapter
            .table()
            .dms()
            .iter()
            .enumerate()
            .map(|(trial, &dm)| summarize(trial, dm, &series.row(trial).to_vec()))
            .collect();
        let best_trial = trials
            .iter()
            .filter(|summary| summary.snr.is_finite())
            .fold(None::<&TrialSummary>, |best, summary| match best {
                Some(top) if top.snr >= summary.snr => Some(top),
                _ => Some(summary),
            })
            .map(|summary| summary.trial);

        let metrics = adapter.metrics();
        Ok(WorkflowResult {
            trials,
            best_trial,
            max_shift: adapter.max_shift(),
            samples_produced: metrics.samples_produced,
            work_calls: metrics.work_calls,
            starved_calls: metrics.starved_calls,
            series,
        })
    }
}

fn summarize(trial: usize, dm: f64, samples: &[f32]) -> TrialSummary {
    let (peak_idx, peak) = StatsHelper::argmax(samples).unwrap_or((0, 0.0));
    let std_dev = StatsHelper::std_dev(samples);
    let snr = if std_dev > 0.0 {
        (peak - StatsHelper::mean(samples)) / std_dev
    } else {
        0.0
    };
    TrialSummary {
        trial,
        dm,
        peak,
        peak_sample: peak_idx as u64,
        snr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_spectrogram, GeneratorConfig};
    use crate::workflow::config::StreamConfig;
    use dedispcore::prelude::DedispersionConfig;

    fn four_channel_workflow() -> WorkflowConfig {
        WorkflowConfig {
            dedispersion: DedispersionConfig {
                vec_length: 4,
                num_dms: 3,
                f_obs: 1400.0,
                bandwidth: 10.0,
                t_int: 0.001,
                samples_per_call: 16,
                sub_band_start: 0,
                sub_band_end: 4,
                dm_step: 400.0,
                ..Default::default()
            },
            stream: StreamConfig {
                chunk_min: 3,
                chunk_max: 40,
                total_samples: 200,
                seed: 5,
            },
            generator: GeneratorConfig {
                pulse_dm: 400.0,
                aligned_sample: 120,
                width_samples: 1,
                amplitude: 1.0,
                noise: 0.0,
                seed: 0,
            },
        }
    }

    #[test]
    fn runner_recovers_pulse_trial() {
        let cfg = four_channel_workflow();
        let spectrogram =
            build_spectrogram(&cfg.generator, &cfg.dedispersion, cfg.stream.total_samples)
                .unwrap();
        let result = Runner::new(cfg).execute(spectrogram.view()).unwrap();

        assert_eq!(result.samples_produced, 200);
        assert_eq!(result.series.dim(), (3, 200));
        assert_eq!(result.best_trial, Some(1));
        let best = result.best().unwrap();
        assert_eq!(best.peak, 4.0);
        assert_eq!(best.peak_sample, 120);
        assert!(result.trials[0].peak <= 1.0);
        assert!(result.trials[2].peak <= 1.0);
    }

    #[test]
    fn runner_reports_starved_cycles_for_small_chunks() {
        let mut cfg = four_channel_workflow();
        cfg.stream.chunk_min = 1;
        cfg.stream.chunk_max = 2;
        let spectrogram = Array2::<f32>::zeros((64, 4));
        let result = Runner::new(cfg).execute(spectrogram.view()).unwrap();
        assert_eq!(result.samples_produced, 64);
        assert!(result.starved_calls > 0);
        assert!(result.work_calls > result.starved_calls);
    }

    #[test]
    fn runner_rejects_empty_chunk_range() {
        let mut cfg = four_channel_workflow();
        cfg.stream.chunk_min = 0;
        let spectrogram = Array2::<f32>::zeros((8, 4));
        assert!(Runner::new(cfg).execute(spectrogram.view()).is_err());
    }
}
