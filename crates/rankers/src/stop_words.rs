//! Fixed English stop-word list used by the tag-bag vectorizer.
//!
//! Tag names are short user-generated phrases ("to-read", "science-fiction",
//! "books-i-own"); after tokenization the glue words in them carry no
//! signal and would otherwise dominate document frequency.

/// English stop words, lowercase. Checked after tokenization, so entries
/// are single tokens.
pub static ENGLISH_STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "aren", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "cannot", "could", "couldn",
    "did", "didn", "do", "does", "doesn", "doing", "don", "down", "during", "each",
    "few", "for", "from", "further", "had", "hadn", "has", "hasn", "have", "haven",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "let",
    "me", "more", "most", "mustn", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "re", "same", "shan", "she", "should",
    "shouldn", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "wasn", "we",
    "were", "weren", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "won", "would", "wouldn", "you", "your", "yours",
    "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_words_present() {
        for word in ["the", "and", "of", "to", "in"] {
            assert!(ENGLISH_STOP_WORDS.contains(&word), "missing {word}");
        }
    }

    #[test]
    fn test_all_lowercase_single_tokens() {
        for word in ENGLISH_STOP_WORDS {
            assert_eq!(*word, word.to_lowercase());
            assert!(word.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }
}
