pub mod adapter;
pub mod classify;
pub mod traits;
pub mod ytdlp;

pub use adapter::EngineAdapter;
pub use classify::{classify_failure, classify_message};
pub use traits::{EngineError, Extractor};
pub use ytdlp::YtDlpExtractor;
