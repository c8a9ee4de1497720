//! Pick the English or the multilingual rerank model from the query's script.

/// Last code point of Latin Extended-B.
const LATIN_END: char = '\u{024F}';

/// Whether every alphabetic character of `query` is Latin script.
pub fn is_latin_script(query: &str) -> bool {
    query
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c <= LATIN_END)
}

/// `english` for Latin-script queries, `multilingual` otherwise.
pub fn select_model<'a>(query: &str, english: &'a str, multilingual: &'a str) -> &'a str {
    if is_latin_script(query) {
        english
    } else {
        multilingual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_queries_use_the_english_model() {
        assert_eq!(select_model("send email", "en", "multi"), "en");
        assert_eq!(select_model("café crème 2024", "en", "multi"), "en");
        assert_eq!(select_model("123 !?", "en", "multi"), "en");
    }

    #[test]
    fn other_scripts_use_the_multilingual_model() {
        assert_eq!(select_model("отправить письмо", "en", "multi"), "multi");
        assert_eq!(select_model("发送邮件", "en", "multi"), "multi");
        assert_eq!(select_model("send メール", "en", "multi"), "multi");
    }
}
