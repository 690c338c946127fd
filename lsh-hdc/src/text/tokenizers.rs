/// Splits text on ASCII whitespace and punctuation, skipping empty pieces.
pub fn tokenize_text<'a>(text: &'a str) -> impl Iterator<Item = &'a str> {
    text.split(|c: char| c.is_ascii_punctuation() || c.is_ascii_whitespace())
        .filter(|&x| !x.is_empty())
}

/// Lowercased word shingles of `size` consecutive tokens, joined by a space.
///
/// Text with fewer than `size` tokens becomes a single shingle of all its tokens,
/// so short posts still get a signature. Text without tokens has no shingles.
///
/// ```
/// use lsh_hdc::text::shingle_words;
///
/// assert_eq!(shingle_words("We all scream, for ICE cream", 4),
///            vec!["we all scream for", "all scream for ice", "scream for ice cream"]);
/// assert_eq!(shingle_words("hello world", 3), vec!["hello world"]);
/// assert!(shingle_words(" ... ", 3).is_empty());
/// ```
pub fn shingle_words(text: &str, size: usize) -> Vec<String> {
    let tokens: Vec<String> = tokenize_text(text).map(|t| t.to_lowercase()).collect();
    if tokens.is_empty() {
        return Vec::new();
    }
    let size = size.max(1);
    if tokens.len() < size {
        return vec![tokens.join(" ")];
    }
    tokens.windows(size).map(|window| window.join(" ")).collect()
}
