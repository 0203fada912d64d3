/// Keeps tab, LF, CR, printable ASCII and everything from U+00A0 up.
fn is_allowed(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\x20'..='\x7e') || c >= '\u{a0}'
}

/// Strips control characters that break JSON-bearing deployment payloads and
/// turns Unicode line/paragraph separators into `\n`. Idempotent.
pub fn sanitize_html(html: &str) -> String {
    html.chars()
        .filter(|c| is_allowed(*c))
        .map(|c| match c {
            '\u{2028}' | '\u{2029}' => '\n',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_control_characters() {
        let dirty = "<p>\u{0}he\u{7}llo\u{1b}[0m\u{7f}\u{85}\u{9f}</p>";
        assert_eq!(sanitize_html(dirty), "<p>hello[0m</p>");
    }

    #[test]
    fn test_keeps_whitespace_and_unicode() {
        let text = "<h1>\tCafé\r\n日本語 🦊\u{a0}</h1>";
        assert_eq!(sanitize_html(text), text);
    }

    #[test]
    fn test_normalizes_separators() {
        assert_eq!(sanitize_html("a\u{2028}b\u{2029}c"), "a\nb\nc");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain ascii",
            "\u{0}\u{1}\u{2}\u{1f}",
            "line\u{2028}sep\u{2029}para\u{0b}\u{0c}",
            "mixed \u{7f}\u{80}\u{9f}\u{a0}\u{ffff}\u{10ffff} end",
            "<script>var s = \"\u{8}\";</script>",
        ];
        for sample in samples {
            let once = sanitize_html(sample);
            assert_eq!(sanitize_html(&once), once, "input {:?}", sample);
        }
    }
}
