//! Download filenames for captured bodies.
//!
//! Contract: `[prefix_]YYYYMMDD_HHMMSS_mmm_<slug>.json`, where the timestamp is
//! the capture time in UTC and the slug comes from the start of the url path.

mod sanitize;
mod slug;

pub(crate) use sanitize::NAME_MAX;
pub use sanitize::sanitize_for_disk;
pub use slug::{url_slug, FALLBACK_SLUG, SLUG_LEN};

use chrono::{DateTime, Utc};

/// `YYYYMMDD_HHMMSS_mmm` for `at`.
pub fn timestamp_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// Builds the filename for a body captured from `url` at `captured_at`.
///
/// # Examples
///
/// - `https://x.test/api/user/list?x=1` at `2024-01-02T03:04:05.006Z`, no prefix
///   → `20240102_030405_006_api_user_l.json`
/// - same with prefix `shop` → `shop_20240102_030405_006_api_user_l.json`
pub fn download_filename(url: &str, captured_at: DateTime<Utc>, prefix: &str) -> String {
    let name = format!("{}_{}.json", timestamp_stamp(captured_at), url_slug(url));
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}_{name}")
    }
}
