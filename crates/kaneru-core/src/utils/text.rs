/// Truncate to at most `max` characters, appending an ellipsis when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_chars("Firefox", 50), "Firefox");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(truncate_chars("日本語のタイトル", 3), "日本語…");
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdefg", 6), "abcdef…");
    }
}
