use crate::prelude::{ChannelOrder, DedispersionConfig, ReferenceFrequency};

/// Centre frequency (MHz) of every channel, linearly spaced across the band.
#[derive(Debug, Clone)]
pub struct ChannelFrequencyMap {
    centers: Vec<f64>,
    f_obs: f64,
    bandwidth: f64,
    width: f64,
}

impl ChannelFrequencyMap {
    pub fn new(config: &DedispersionConfig) -> Self {
        let channels = config.vec_length.max(1);
        let width = config.bandwidth / channels as f64;
        let bottom = config.f_obs - config.bandwidth / 2.0;
        let top = config.f_obs + config.bandwidth / 2.0;

        let centers = (0..config.vec_length)
            .map(|c| {
                let offset = (c as f64 + 0.5) * width;
                match config.channel_order {
                    ChannelOrder::Ascending => bottom + offset,
                    ChannelOrder::Descending => top - offset,
                }
            })
            .collect();

        Self {
            centers,
            f_obs: config.f_obs,
            bandwidth: config.bandwidth,
            width,
        }
    }

    pub fn frequency(&self, channel: usize) -> Option<f64> {
        self.centers.get(channel).copied()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.centers
    }

    pub fn channel_width(&self) -> f64 {
        self.width
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Frequency the delays are measured against for the given convention.
    pub fn reference_mhz(&self, reference: ReferenceFrequency) -> f64 {
        match reference {
            ReferenceFrequency::HighestChannel => self.f_obs + (self.bandwidth - self.width) / 2.0,
            ReferenceFrequency::TopEdge => self.f_obs + self.bandwidth / 2.0,
            ReferenceFrequency::Center => self.f_obs,
        }
    }
}
