//! TF-IDF vectorization of tag-bag documents.
//!
//! Term weights are raw term counts scaled by a smoothed inverse document
//! frequency, `ln((1 + n) / (1 + df)) + 1`, then L2-normalized per
//! document. With unit-length rows, cosine similarity reduces to a sparse
//! dot product.

use crate::stop_words::ENGLISH_STOP_WORDS;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Minimum token length; single characters are noise in tag text
const MIN_TOKEN_LEN: usize = 2;

/// An L2-normalized sparse document vector.
///
/// Terms are stored sorted by term id so that the dot product is a linear
/// merge. An empty document is an all-zero vector: valid, and orthogonal
/// to everything including itself.
#[derive(Debug, Clone, Default)]
pub struct DocVector {
    terms: Vec<(u32, f64)>,
}

impl DocVector {
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sparse dot product by merging the two sorted term lists
    pub fn dot(&self, other: &DocVector) -> f64 {
        let mut sum = 0.0;
        let (mut a, mut b) = (0, 0);
        while a < self.terms.len() && b < other.terms.len() {
            let (ta, wa) = self.terms[a];
            let (tb, wb) = other.terms[b];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }
}

/// The fitted corpus: vocabulary plus one vector per input document
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    vocabulary: HashMap<String, u32>,
    rows: Vec<DocVector>,
}

impl TfIdfMatrix {
    pub fn rows(&self) -> &[DocVector] {
        &self.rows
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }
}

/// Tokenizes and weights documents with English stop-word filtering
pub struct TfIdfVectorizer {
    stop_words: HashSet<&'static str>,
}

impl TfIdfVectorizer {
    /// Vectorizer with the built-in English stop-word list
    pub fn english() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Lowercase alphanumeric runs, minimum length two, stop words removed.
    /// "Young-Adult Fantasy" -> ["young", "adult", "fantasy"]
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= MIN_TOKEN_LEN)
            .filter(|t| !self.stop_words.contains(t))
            .map(|t| t.to_string())
            .collect()
    }

    /// Fit the vocabulary over `docs` and produce one normalized vector
    /// per document, in input order.
    pub fn fit_transform(&self, docs: &[String]) -> TfIdfMatrix {
        let tokenized: Vec<Vec<String>> = docs
            .par_iter()
            .map(|doc| self.tokenize(doc))
            .collect();

        // Sorted unique terms give a deterministic vocabulary numbering
        let vocabulary: HashMap<String, u32> = tokenized
            .iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as u32))
            .collect();

        // Document frequency per term id
        let mut df = vec![0u32; vocabulary.len()];
        for tokens in &tokenized {
            let unique: HashSet<&String> = tokens.iter().collect();
            for term in unique {
                df[vocabulary[term] as usize] += 1;
            }
        }

        // Smoothed idf: never zero, never divides by zero
        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<DocVector> = tokenized
            .par_iter()
            .map(|tokens| {
                let mut counts: HashMap<u32, f64> = HashMap::new();
                for term in tokens {
                    *counts.entry(vocabulary[term]).or_insert(0.0) += 1.0;
                }

                let mut terms: Vec<(u32, f64)> = counts
                    .into_iter()
                    .map(|(id, tf)| (id, tf * idf[id as usize]))
                    .collect();
                terms.sort_unstable_by_key(|&(id, _)| id);

                let norm = terms.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in &mut terms {
                        *w /= norm;
                    }
                }

                DocVector { terms }
            })
            .collect();

        TfIdfMatrix { vocabulary, rows }
    }
}
