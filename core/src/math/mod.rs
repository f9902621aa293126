pub mod delay;
pub mod frequency;
pub mod stats;

pub use delay::{delay_seconds, delay_to_samples, DISPERSION_CONSTANT};
pub use frequency::ChannelFrequencyMap;
pub use stats::StatsHelper;
