//! ICS text value escaping.

/// Decodes a backslash-escaped ICS text value.
///
/// `\n` and `\N` become a line feed; `\,`, `\;` and `\\` become the escaped
/// character. Escapes are decoded in a single left-to-right pass, so `\\n`
/// decodes to a backslash followed by `n`. Any other backslash sequence is
/// kept verbatim. The result is trimmed.
pub fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out.trim().to_string()
}

/// Escapes a text value for writing into an ICS property.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_escapes() {
        assert_eq!(decode_text("A\\,B\\;C\\nD"), "A,B;C\nD");
        assert_eq!(decode_text("one\\Ntwo"), "one\ntwo");
        assert_eq!(decode_text("back\\\\slash"), "back\\slash");
    }

    #[test]
    fn single_pass_does_not_rescan_output() {
        // The escaped backslash is consumed before `n` is seen.
        assert_eq!(decode_text("a\\\\nb"), "a\\nb");
    }

    #[test]
    fn unknown_escapes_are_kept() {
        assert_eq!(decode_text("C:\\path\\t"), "C:\\path\\t");
        assert_eq!(decode_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn result_is_trimmed() {
        assert_eq!(decode_text("  padded \\n"), "padded");
        assert_eq!(decode_text(""), "");
    }

    #[test]
    fn escape_reverses_decode() {
        let text = "Room 1, floor 2; bring a\\b\nthanks";
        assert_eq!(escape_text(text), "Room 1\\, floor 2\\; bring a\\\\b\\nthanks");
        assert_eq!(decode_text(&escape_text(text)), text);
    }

    #[test]
    fn escape_folds_every_line_ending() {
        assert_eq!(escape_text("a\r\nb"), "a\\nb");
        assert_eq!(escape_text("a\rb\nc"), "a\\nb\\nc");
    }
}
