//! Url slug: a short, filesystem-safe hint of which endpoint a file came from.

/// Characters of the url path kept before sanitizing.
pub const SLUG_LEN: usize = 10;

/// Slug used when the url does not parse or nothing usable survives.
pub const FALLBACK_SLUG: &str = "url";

/// Path without its leading slash, slashes turned into `_`, cut to
/// [`SLUG_LEN`] characters, then stripped to `[A-Za-z0-9_-]`.
///
/// Truncation happens before stripping, so the slug can be shorter than
/// `SLUG_LEN` when the path starts with characters that get removed.
pub fn url_slug(url: &str) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return FALLBACK_SLUG.to_string();
    };
    let path = parsed.path();
    let slug: String = path
        .strip_prefix('/')
        .unwrap_or(path)
        .replace('/', "_")
        .chars()
        .take(SLUG_LEN)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
