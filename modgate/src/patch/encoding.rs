//! Percent-escaping of patch body lines.
//!
//! Body text is escaped the way `encodeURI` does it, except that a space is
//! kept literally. Decoding treats `+` as a literal plus sign.

/// Characters written to a patch body without escaping.
fn is_unescaped(c: char) -> bool {
    c.is_ascii_alphanumeric() || " -_.!~*'();/?:@&=+$,#".contains(c)
}

/// Escape text for a patch body line.
///
/// ```
/// use modgate::patch::encode_body;
///
/// assert_eq!(encode_body("a b\n"), "a b%0A");
/// assert_eq!(encode_body("100%"), "100%25");
/// assert_eq!(encode_body("é"), "%C3%A9");
/// ```
pub fn encode_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if is_unescaped(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

/// Decode an escaped patch body line.
///
/// Returns a description of the problem when an escape is truncated, not
/// hexadecimal, or the decoded bytes are not UTF-8.
///
/// ```
/// use modgate::patch::decode_body;
///
/// assert_eq!(decode_body("a+b%0A").unwrap(), "a+b\n");
/// assert!(decode_body("%G0").is_err());
/// ```
pub fn decode_body(text: &str) -> Result<String, String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or_else(|| format!("truncated escape at byte {}", i))?;
            let value = std::str::from_utf8(hex)
                .ok()
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| format!("invalid escape '%{}'", String::from_utf8_lossy(hex)))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| format!("escaped bytes are not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_survives_unescaped() {
        let line = "<div class=\"x\">";
        assert_eq!(encode_body(line), "%3Cdiv class=%22x%22%3E");
    }

    #[test]
    fn test_reserved_characters_kept() {
        let url = "https://a.b/c?d=e&f=g#h";
        assert_eq!(encode_body(url), url);
    }

    #[test]
    fn test_decode_multibyte() {
        assert_eq!(decode_body("caf%C3%A9").unwrap(), "café");
    }

    #[test]
    fn test_decode_lowercase_hex() {
        assert_eq!(decode_body("%0a%2b").unwrap(), "\n+");
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_body("abc%4").is_err());
        assert!(decode_body("%").is_err());
        assert!(decode_body("%+1").is_err());
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(decode_body("%C3").is_err());
    }

    #[test]
    fn test_decode_passes_raw_unicode() {
        assert_eq!(decode_body("ünï").unwrap(), "ünï");
    }

    #[test]
    fn test_encode_then_decode_tabs_and_newlines() {
        let text = "\tline one\r\nline two\n";
        assert_eq!(decode_body(&encode_body(text)).unwrap(), text);
    }
}
