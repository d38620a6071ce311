//! Android resource value escaping.
//!
//! Element text containing bare quotes or a leading resource-reference sigil
//! (`@`, `?`) is invalid in the resource format. Translation output often
//! reintroduces both (typographic quotes especially), so every value is
//! passed through here before being written back into a document.
//!
//! The function is idempotent: quotes already preceded by a backslash are
//! left alone, and a value already guarded with `\@` no longer starts
//! with `@`.

/// Normalize typographic quotes and escape what Android requires escaped.
pub fn escape_android_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev_backslash = false;
    for c in text.chars() {
        let c = match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        };
        if (c == '\'' || c == '"') && !prev_backslash {
            out.push('\\');
        }
        out.push(c);
        prev_backslash = c == '\\' && !prev_backslash;
    }

    if out.starts_with('@') || out.starts_with('?') {
        out.insert(0, '\\');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_quotes_escaped() {
        assert_eq!(escape_android_value("it's"), r"it\'s");
        assert_eq!(escape_android_value(r#"say "hi""#), r#"say \"hi\""#);
    }

    #[test]
    fn test_already_escaped_untouched() {
        assert_eq!(escape_android_value(r"it\'s"), r"it\'s");
        assert_eq!(escape_android_value(r#"say \"hi\""#), r#"say \"hi\""#);
    }

    #[test]
    fn test_curly_quotes_normalized() {
        assert_eq!(escape_android_value("it\u{2019}s"), r"it\'s");
        assert_eq!(
            escape_android_value("\u{201C}quoted\u{201D}"),
            r#"\"quoted\""#
        );
    }

    #[test]
    fn test_leading_sigils_guarded() {
        assert_eq!(escape_android_value("@string/other"), r"\@string/other");
        assert_eq!(escape_android_value("?attr/color"), r"\?attr/color");
        // Mid-string sigils are fine.
        assert_eq!(escape_android_value("mail@example"), "mail@example");
    }

    #[test]
    fn test_idempotence() {
        let cases = [
            "it's",
            r"it\'s",
            "@string/other",
            "?attr/color",
            "it\u{2019}s a \u{201C}test\u{201D}",
            r"escaped backslash \\ then 'quote'",
            "plain text %s with \\n escape",
        ];
        for case in cases {
            let once = escape_android_value(case);
            let twice = escape_android_value(&once);
            assert_eq!(once, twice, "double escape for {case:?}");
        }
    }

    #[test]
    fn test_escaped_backslash_does_not_protect_quote() {
        // \\' is an escaped backslash followed by a bare quote.
        assert_eq!(escape_android_value(r"a\\'b"), r"a\\\'b");
    }
}
