//! Text decoding and cleanup helpers
//!
//! The corpus contains everything from plain-ASCII advisories to raw
//! binaries, so decoding is always permissive: bytes that are not valid
//! UTF-8 are replaced rather than rejected.

/// Decodes raw bytes into text, replacing invalid UTF-8 sequences.
pub fn decode_lossy(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Fraction of characters that are printable (or whitespace).
///
/// Used to distinguish text-bearing files from binaries after a lossy
/// decode: a decoded binary is dominated by replacement and control
/// characters.
pub fn printable_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 1.0;
    }
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() && *c != char::REPLACEMENT_CHARACTER)
        .count();
    printable as f64 / total as f64
}

/// Collapses runs of whitespace and strips non-printable characters.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else if !c.is_control() && c != char::REPLACEMENT_CHARACTER {
            out.push(c);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lossy_valid_utf8() {
        assert_eq!(decode_lossy(b"hello world"), "hello world");
    }

    #[test]
    fn test_decode_lossy_invalid_bytes() {
        let decoded = decode_lossy(&[0x68, 0x69, 0xff, 0xfe]);
        assert!(decoded.starts_with("hi"));
        assert!(decoded.contains(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_printable_ratio_text() {
        assert!(printable_ratio("plain ascii text") > 0.9);
    }

    #[test]
    fn test_printable_ratio_binary() {
        let decoded = decode_lossy(&[0x00, 0x01, 0xff, 0xfe, 0x00, 0x02, 0x7f, 0x00]);
        assert!(printable_ratio(&decoded) < 0.5);
    }

    #[test]
    fn test_printable_ratio_empty() {
        assert_eq!(printable_ratio(""), 1.0);
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("a  b\n\nc\t d"), "a b c d");
    }

    #[test]
    fn test_clean_text_strips_control_chars() {
        assert_eq!(clean_text("a\x00b\x07c"), "abc");
    }

    #[test]
    fn test_clean_text_trims() {
        assert_eq!(clean_text("  padded  "), "padded");
    }
}
