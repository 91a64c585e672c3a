//! Filename hint from a Content-Disposition header value.

/// Returns the filename carried by a Content-Disposition value, if any.
///
/// `filename*=UTF-8''...` (RFC 5987) wins over plain `filename=`, which may be
/// quoted (backslash escapes honored) or a bare token.
pub fn content_disposition_filename(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';').map(str::trim) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("filename*") {
            let encoded = value
                .get(..7)
                .filter(|p| p.eq_ignore_ascii_case("utf-8''"))
                .map(|_| &value[7..]);
            if let Some(encoded) = encoded {
                let decoded = unescape_quoted(&percent_decode(encoded));
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        } else if name.eq_ignore_ascii_case("filename") {
            let v = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                Some(inner) => unescape_quoted(inner),
                None => value.to_string(),
            };
            if !v.is_empty() {
                plain = Some(v);
            }
        }
    }

    plain
}

/// Drops the backslash in front of `"` and `\` inside a quoted-string.
fn unescape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Lossy percent-decoding; malformed escapes are kept as-is.
pub(crate) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
