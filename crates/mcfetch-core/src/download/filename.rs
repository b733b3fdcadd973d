//! Local filename for a downloaded machine config archive.

/// Suffix every saved archive carries.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Name from a `Content-Disposition` value ending in `=<name>.tar.gz`.
///
/// The text after the last `=` is taken (surrounding quotes dropped); it
/// must end in `.tar.gz` (any case) with a non-empty stem. The result is
/// sanitized and always ends in lowercase `.tar.gz`.
pub fn filename_from_disposition(header_value: &str) -> Option<String> {
    let (_, tail) = header_value.trim().rsplit_once('=')?;
    let tail = tail.trim().trim_matches('"');
    let stem = strip_suffix_ignore_ascii_case(tail, ARCHIVE_SUFFIX)?;
    let stem = sanitize_filename(stem);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{stem}{ARCHIVE_SUFFIX}"))
}

/// `<hostId>.tar.gz`, used when the header gives no usable name.
pub fn fallback_filename(host_id: &str) -> String {
    let stem = sanitize_filename(host_id);
    if stem.is_empty() {
        format!("host{ARCHIVE_SUFFIX}")
    } else {
        format!("{stem}{ARCHIVE_SUFFIX}")
    }
}

fn strip_suffix_ignore_ascii_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(cut) || !s[cut..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&s[..cut])
}

/// Sanitizes a candidate filename stem for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length so the suffixed name fits NAME_MAX (255 bytes)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255 - ARCHIVE_SUFFIX.len();

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let bad = c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let replacement = if bad { '_' } else { c };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
