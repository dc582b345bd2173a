//! Line unfolding.
//!
//! ICS producers fold long lines by breaking them and starting the
//! continuation with a single space or tab. [`unfold`] joins them back.

/// Splits raw ICS text into logical lines.
///
/// Lines are separated by `\r\n`, `\r` or `\n`. A non-empty line that begins
/// with a space or tab continues the previous logical line: exactly one
/// leading character is dropped and the rest appended. A continuation with
/// nothing before it starts a new line. Other lines, empty ones included,
/// are kept as they are.
pub fn unfold(raw: &str) -> Vec<String> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();

    for line in normalized.split('\n') {
        match line.strip_prefix([' ', '\t']) {
            Some(rest) => match lines.last_mut() {
                Some(previous) => previous.push_str(rest),
                None => lines.push(rest.to_string()),
            },
            None => lines.push(line.to_string()),
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_space_continuation() {
        assert_eq!(unfold("SUMMARY:Hello\n World"), vec!["SUMMARY:HelloWorld"]);
    }

    #[test]
    fn joins_tab_continuation_and_drops_one_char_only() {
        assert_eq!(
            unfold("DESCRIPTION:a\r\n\t  b\r\nUID:1"),
            vec!["DESCRIPTION:a  b", "UID:1"]
        );
    }

    #[test]
    fn handles_all_line_endings() {
        assert_eq!(unfold("A:1\r\nB:2\rC:3\nD:4"), vec!["A:1", "B:2", "C:3", "D:4"]);
    }

    #[test]
    fn leading_continuation_starts_a_line() {
        assert_eq!(unfold(" orphan\nX:1"), vec!["orphan", "X:1"]);
    }

    #[test]
    fn empty_lines_are_kept() {
        assert_eq!(unfold("A:1\n\nB:2"), vec!["A:1", "", "B:2"]);
        assert_eq!(unfold(""), vec![""]);
    }
}
