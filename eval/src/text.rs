// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Lightweight text normalisation shared by the extractor and the lexical provider

use std::collections::BTreeSet;

/// Function words ignored when comparing content
const STOPWORDS: &[&str] = &[
    "a", "about", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "being",
    "between", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "if", "in", "into", "is", "it", "its", "may", "might", "more",
    "most", "of", "on", "or", "our", "over", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to",
    "very", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would",
];

/// Words that flip the polarity of a statement
const NEGATIONS: &[&str] = &[
    "no", "not", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
];

/// Split text into lowercase word tokens (apostrophes kept inside words)
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|s| s.trim_matches('\''))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

/// Whether the text contains a negation marker
pub fn has_negation(text: &str) -> bool {
    tokenize(text).iter().any(|t| is_negation(t))
}

/// Crude suffix stripping so that "refuted"/"refutes" and "vaccine"/"vaccines" meet
pub fn stem(word: &str) -> String {
    let mut w = word.to_string();
    if w.len() > 4 && w.ends_with("ies") {
        w.truncate(w.len() - 3);
        w.push('y');
    } else if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
        w.pop();
    }
    if w.len() > 5 && w.ends_with("ing") {
        w.truncate(w.len() - 3);
    } else if w.len() > 4 && w.ends_with("ed") {
        w.truncate(w.len() - 2);
    }
    if w.len() > 3 && w.ends_with('e') {
        w.pop();
    }
    w
}

/// Stemmed content words, without stopwords or negation markers
pub fn content_stems(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()) && !is_negation(t))
        .map(|t| stem(&t))
        .collect()
}

/// Dice coefficient between two stem sets (1.0 when both are empty)
pub fn dice(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count() as f64;
    2.0 * shared / (a.len() + b.len()) as f64
}

/// Fraction of letters among non-whitespace characters
pub fn alpha_ratio(text: &str) -> f64 {
    let mut letters = 0usize;
    let mut visible = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        visible += 1;
        if c.is_alphabetic() {
            letters += 1;
        }
    }
    if visible == 0 {
        return 0.0;
    }
    letters as f64 / visible as f64
}

/// Whether the text contains at least one word of two or more letters
pub fn has_word(text: &str) -> bool {
    text.split(|c: char| !c.is_alphabetic())
        .any(|w| w.chars().count() >= 2)
}

/// Trim whitespace and clause punctuation from a segment
pub fn trim_clause(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '.' | '!' | '?'))
}
