pub mod block;
pub mod record;

pub use block::SpectrogramBlock;
pub use record::OutputRecord;
