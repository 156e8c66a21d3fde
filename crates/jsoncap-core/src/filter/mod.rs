//! Filter engine: decides what happens to a network response.
//!
//! The pipeline short-circuits on the first gate that rejects:
//! 1. type/status gate (json mime, no redirects, no 204/205)
//! 2. smart filter for telemetry-looking urls (when enabled)
//! 3. blacklist keywords
//! 4. whitelist membership, which only matters in manual mode
//!
//! Everything here is pure; callers pass an immutable `RuleSet` snapshot.

mod decide;
mod noise;
mod rules;

pub use decide::{decide, type_gate, Decision, IgnoreReason};
pub use noise::{noise_hit, NOISE_KEYWORDS};
pub use rules::{Mode, RuleSet, WhitelistEntry};
