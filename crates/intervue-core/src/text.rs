//! Text canonicalization used before keyword matching.

/// Canonicalize text for matching.
///
/// Lowercases, drops every character that is neither an ASCII word
/// character (`[a-z0-9_]`) nor whitespace, collapses whitespace runs into a
/// single space and trims both ends. Accented and non-Latin letters are
/// dropped, so "Café" becomes "caf".
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-separated words, ignoring empty tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_case_and_punctuation() {
        assert_eq!(
            normalize("Recursion requires a Base-Case!"),
            "recursion requires a basecase"
        );
        assert_eq!(normalize("snake_case, kept."), "snake_case kept");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a \t\n b   c  "), "a b c");
        assert_eq!(normalize("word - word"), "word word");
    }

    #[test]
    fn normalize_empty_and_symbols_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!... --"), "");
    }

    #[test]
    fn normalize_keeps_only_ascii_word_characters() {
        assert_eq!(normalize("Café Größe"), "caf gre");
        assert_eq!(normalize("naïve_approach №2"), "nave_approach 2");
        assert_eq!(normalize("日本語"), "");
    }

    #[test]
    fn count_words_ignores_extra_whitespace() {
        assert_eq!(count_words("  one  two\tthree\n"), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("punctuation , counts"), 3);
    }
}
