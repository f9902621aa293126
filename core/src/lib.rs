//! Streaming incoherent-dedispersion core for radio-astronomy spectrograms.
//!
//! A [`processing::StreamingAdapter`] sits between a pull-based host and the
//! [`processing::DedispersionEngine`]; the engine shifts and sums channels
//! according to a precomputed [`processing::TrialShiftTable`].

pub mod math;
pub mod prelude;
pub mod processing;
pub mod stream_interface;
pub mod telemetry;

pub use prelude::{DedispError, DedispResult, DedispersionConfig, StreamBlock, WorkOutput};
