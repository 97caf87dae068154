use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Case-insensitive, unanchored substring match against the keyword list.
/// Keywords are expected to be lower-cased already (`Config::load` does that).
pub fn matches_any_keyword(text: &str, keywords: &[String]) -> bool {
    let haystack = text.to_lowercase();
    keywords.iter().any(|keyword| haystack.contains(keyword.as_str()))
}
