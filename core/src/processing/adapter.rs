use std::sync::Arc;

use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

use crate::prelude::{DedispError, DedispResult, DedispersionConfig, StreamBlock, WorkOutput};
use crate::processing::engine::DedispersionEngine;
use crate::processing::history::HistoryBuffer;
use crate::processing::trial_table::TrialShiftTable;
use crate::stream_interface::OutputRecord;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    AwaitingInput,
    Producing,
}

/// Bridges a pull-based host to the dedispersion engine.
///
/// The host hands over its unconsumed spectra each cycle. The adapter
/// prepends the `max_shift` rows it carried from the previous cycle, so only
/// `noutput_items` of the forecast `noutput_items + max_shift` need to be
/// fresh. Output column `t` always corresponds to the `t`-th fresh row.
pub struct StreamingAdapter {
    config: DedispersionConfig,
    engine: DedispersionEngine,
    history: HistoryBuffer,
    state: AdapterState,
    samples_consumed: u64,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl StreamingAdapter {
    pub fn new(config: DedispersionConfig) -> DedispResult<Self> {
        let table = Arc::new(TrialShiftTable::build(&config)?);
        Ok(Self::assemble(config, table))
    }

    /// Build around an existing table, e.g. to share one across instances.
    pub fn with_table(
        config: DedispersionConfig,
        table: Arc<TrialShiftTable>,
    ) -> DedispResult<Self> {
        config.validate()?;
        if !table.describes(&config) {
            return Err(DedispError::InvalidConfiguration(
                "trial table was built for a different configuration".into(),
            ));
        }
        Ok(Self::assemble(config, table))
    }

    fn assemble(config: DedispersionConfig, table: Arc<TrialShiftTable>) -> Self {
        let history = HistoryBuffer::zeroed(table.max_shift(), config.vec_length);
        Self {
            engine: DedispersionEngine::new(table),
            history,
            state: AdapterState::AwaitingInput,
            samples_consumed: 0,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("stream-adapter"),
            config,
        }
    }

    pub fn config(&self) -> &DedispersionConfig {
        &self.config
    }

    pub fn table(&self) -> &TrialShiftTable {
        self.engine.table()
    }

    pub fn max_shift(&self) -> usize {
        self.table().max_shift()
    }

    /// `Producing` only holds inside `general_work`, so between calls this
    /// always reports `AwaitingInput`.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Absolute stream index of the next sample to be consumed.
    pub fn position(&self) -> u64 {
        self.samples_consumed
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn transition(&mut self, next: AdapterState) {
        if self.state != next {
            self.logger.detail(&format!("{:?} -> {:?}", self.state, next));
            self.state = next;
        }
    }

    fn record(&self, series: Option<Array2<f32>>) -> OutputRecord {
        let dms = self.table().dms().to_vec();
        match series {
            Some(series) => OutputRecord::new(self.samples_consumed, dms, series),
            None => OutputRecord::empty(self.samples_consumed, dms),
        }
    }
}

impl StreamBlock for StreamingAdapter {
    fn forecast(&self, noutput_items: usize) -> usize {
        noutput_items.saturating_add(self.max_shift())
    }

    fn general_work(
        &mut self,
        noutput_items: usize,
        input: ArrayView2<'_, f32>,
    ) -> DedispResult<WorkOutput> {
        if input.ncols() != self.config.vec_length {
            return Err(DedispError::InvalidInput(format!(
                "input has {} channels, expected {}",
                input.ncols(),
                self.config.vec_length
            )));
        }

        let target = noutput_items.min(self.config.samples_per_call);
        let available = self.history.depth() + input.nrows();
        if target == 0 || available < self.forecast(target) {
            self.metrics.record_starved();
            self.logger.detail(&format!(
                "awaiting input: {} of {} samples available",
                available,
                self.forecast(target)
            ));
            return Ok(WorkOutput {
                consumed: 0,
                produced: 0,
                records: self.record(None),
            });
        }

        self.transition(AdapterState::Producing);

        let fresh = input.slice(s![..target, ..]);
        let window = concatenate(Axis(0), &[self.history.view(), fresh])
            .map_err(|err| DedispError::InvalidInput(format!("assembling window: {}", err)))?;

        let series = match self.engine.dedisperse(window.view(), self.history.depth()) {
            Ok(series) => series,
            Err(err) => {
                self.logger.violation(&format!("engine rejected window: {}", err));
                self.transition(AdapterState::AwaitingInput);
                return Err(err);
            }
        };
        self.history.advance(window.view());

        let records = self.record(Some(series));
        self.samples_consumed += target as u64;
        self.metrics.record_produced(target);
        self.transition(AdapterState::AwaitingInput);

        Ok(WorkOutput {
            consumed: target,
            produced: target,
            records,
        })
    }

    fn reset(&mut self) {
        self.history.reset();
        self.samples_consumed = 0;
        self.metrics.reset();
        self.state = AdapterState::AwaitingInput;
        self.logger.record("stream reset");
    }
}
