pub mod adapter;
pub mod engine;
pub mod history;
pub mod trial_table;

pub use adapter::{AdapterState, StreamingAdapter};
pub use engine::DedispersionEngine;
pub use history::HistoryBuffer;
pub use trial_table::TrialShiftTable;
