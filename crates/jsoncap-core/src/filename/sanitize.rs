//! Making a generated filename safe to create on a Linux filesystem.

pub(crate) const NAME_MAX: usize = 255;

/// Sanitizes `name` for use as a single path component.
///
/// Path separators, NUL, and control characters become `_`; every other
/// character, underscores included, is kept as generated. Leading/trailing
/// dots and spaces go, and the result is cut to 255 bytes on a char boundary
/// keeping the extension when it fits. Returns `None` if nothing usable is left.
pub fn sanitize_for_disk(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c == '\0' || c.is_control() {
            '_'
        } else {
            c
        };
        out.push(c);
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.chars().all(|c| c == '_') {
        return None;
    }
    if trimmed.len() <= NAME_MAX {
        return Some(trimmed.to_string());
    }

    let (stem, ext) = match trimmed.rfind('.') {
        Some(i) if trimmed.len() - i <= 16 => trimmed.split_at(i),
        _ => (trimmed, ""),
    };
    let mut take = NAME_MAX - ext.len();
    while !stem.is_char_boundary(take) {
        take -= 1;
    }
    Some(format!("{}{}", &stem[..take], ext))
}
