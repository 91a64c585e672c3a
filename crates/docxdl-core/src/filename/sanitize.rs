//! Linux-safe filename sanitization.

/// Linux NAME_MAX, in bytes.
pub const NAME_MAX: usize = 255;

/// Makes a candidate filename safe to create on Linux.
///
/// NUL, `/`, `\`, control characters and whitespace become `_` (runs collapse
/// to one), leading/trailing dots and underscores are trimmed, and the result is
/// cut to NAME_MAX bytes. When cutting, `keep_suffix` (e.g. `.docx`) is
/// preserved at the end.
pub fn sanitize_filename(name: &str, keep_suffix: Option<&str>) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        if bad {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_');
    fit_name_max(trimmed, keep_suffix)
}

/// Keeps `name` as close to the original as Linux allows.
///
/// Only `/`, NUL and control characters are replaced (one `_` each); spaces,
/// leading dots and underscores survive. Over-long names are cut like
/// [`sanitize_filename`] does.
pub fn preserve_filename(name: &str, keep_suffix: Option<&str>) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c == '/' || c.is_control() { '_' } else { c })
        .collect();
    fit_name_max(&replaced, keep_suffix)
}

fn fit_name_max(name: &str, keep_suffix: Option<&str>) -> String {
    if name.len() <= NAME_MAX {
        return name.to_string();
    }

    let suffix = keep_suffix
        .filter(|s| name.ends_with(s) && s.len() < NAME_MAX)
        .unwrap_or("");
    let mut take = NAME_MAX - suffix.len();
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{}", &name[..take], suffix)
}
