/// Text normalization for OCR output
///
/// OCR over arbitrary screen content produces plenty of junk: box-drawing
/// characters, stray punctuation, partial glyphs. Normalization reduces the
/// raw text to ASCII letters, digits, and whitespace before it reaches the
/// translation and scoring stages.
///
/// Both stages only ever remove characters; normalized text is a strict
/// reduction of its input.

/// Drop everything that is not printable ASCII, keeping whitespace
/// (spaces, tabs, newlines survive; control bytes and non-ASCII do not).
pub fn strip_non_ascii(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
        .collect()
}

/// Reduce raw OCR output to ASCII letters, digits, and whitespace, trimmed.
pub fn normalize(text: &str) -> String {
    strip_non_ascii(text)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_only_letters_digits_whitespace() {
        let input = "Hello, world! 123 <tags> & sym*bols";
        let out = normalize(input);

        assert!(out
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace()));
        assert_eq!(out, "Hello world 123 tags  symbols");
    }

    #[test]
    fn test_normalize_never_adds_characters() {
        // Every character of the output must appear in the input, in order.
        let input = "a€b\u{7}c — d1!";
        let out = normalize(input);

        let mut rest = input.chars();
        for c in out.chars() {
            assert!(
                rest.any(|orig| orig == c),
                "character {c:?} not found in input order"
            );
        }
    }

    #[test]
    fn test_normalize_strips_non_ascii_scripts() {
        assert_eq!(normalize("こんにちは Hello 世界"), "Hello");
    }

    #[test]
    fn test_normalize_empty_and_junk_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("★☆♥ — …"), "");
        assert_eq!(normalize("   \n\t  "), "");
    }

    #[test]
    fn test_strip_non_ascii_keeps_interior_whitespace() {
        assert_eq!(strip_non_ascii("a\tb\nc"), "a\tb\nc");
        assert_eq!(strip_non_ascii("caf\u{e9}"), "caf");
    }

    #[test]
    fn test_normalize_accented_text_stays_nonempty() {
        // Latin-script text with accents loses the accented letters only.
        let out = normalize("Eres in\u{fa}til y deber\u{ed}as renunciar.");
        assert!(!out.is_empty());
        assert!(out.contains("renunciar"));
    }
}
