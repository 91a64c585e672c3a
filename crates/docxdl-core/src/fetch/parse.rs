//! Pick the headers we care about out of raw response header lines.

/// Headers of the final response (after redirects).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Parses collected header lines. With redirects curl reports every hop's
/// headers in order; a status line resets what was seen so far so only the
/// last response counts.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-disposition") {
            out.content_disposition = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-type") {
            out.content_type = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-length") {
            out.content_length = value.parse().ok();
        }
    }

    out
}
