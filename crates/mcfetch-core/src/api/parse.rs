//! Parse HTTP response header lines into ResponseHead.

/// Headers the client cares about from an API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
    /// Body size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
}

/// Parse collected header lines into ResponseHead.
///
/// Blank separators are skipped. A status line starts a new response, so
/// only headers of the final response (after redirects) are kept.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                head.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    head.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                head.content_disposition = Some(value.to_string());
            }
        }
    }

    head
}
