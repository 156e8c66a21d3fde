//! Fixed noise-keyword list used by the smart filter.

/// Url fragments typical of telemetry, logging, and UI chrome endpoints.
/// Matched case-insensitively as substrings; false positives are accepted.
pub const NOISE_KEYWORDS: [&str; 8] = [
    "notification",
    "notice",
    "log",
    "menu",
    "alarm",
    "event",
    "track",
    "analytics",
];

/// Returns the first noise keyword found in `url`, if any.
pub fn noise_hit(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    NOISE_KEYWORDS.iter().copied().find(|k| lower.contains(k))
}
