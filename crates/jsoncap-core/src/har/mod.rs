//! HAR (HTTP Archive) replay: feeds a recorded session through the capture pipeline.

mod parse;
mod replay;

pub use replay::HarReplay;
