use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Default)]
struct Metrics {
    work_calls: usize,
    samples_produced: usize,
    starved_calls: usize,
}

/// Point-in-time copy of the adapter counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub work_calls: usize,
    pub samples_produced: usize,
    pub starved_calls: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_produced(&self, samples: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.work_calls += 1;
            metrics.samples_produced += samples;
        }
    }

    pub fn record_starved(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.work_calls += 1;
            metrics.starved_calls += 1;
        }
    }

    pub fn reset(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            *metrics = Metrics::default();
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                work_calls: metrics.work_calls,
                samples_produced: metrics.samples_produced,
                starved_calls: metrics.starved_calls,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        let metrics = MetricsRecorder::new();
        metrics.record_produced(16);
        metrics.record_starved();
        metrics.record_produced(4);
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                work_calls: 3,
                samples_produced: 20,
                starved_calls: 1,
            }
        );
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
