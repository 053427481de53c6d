//! Token-set similarity for grouping near-identical gap themes.

use std::collections::HashSet;

/// Words too common to carry theme identity.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "for", "has", "have", "in", "is", "it", "no", "not", "of", "on",
    "or", "the", "their", "they", "to", "with",
];

/// Lowercased alphanumeric tokens, stopwords removed.
pub(crate) fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() > 1 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Jaccard similarity over token sets, in `[0, 1]`. Two texts with no
/// usable tokens are not similar.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_are_fully_similar() {
        assert!((token_similarity("no live chat support", "no live chat support") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn casing_and_punctuation_do_not_matter() {
        assert!(
            (token_similarity("No live-chat support!", "no live chat support") - 1.0).abs() < 1e-9
        );
    }

    #[test]
    fn near_identical_phrasings_score_high() {
        let similarity = token_similarity(
            "lacks live chat support",
            "no live chat support offered",
        );
        assert!(similarity >= 0.5, "got {similarity}");
    }

    #[test]
    fn unrelated_texts_score_low() {
        let similarity = token_similarity("no live chat support", "expensive enterprise pricing");
        assert!(similarity < 0.2, "got {similarity}");
    }

    #[test]
    fn empty_or_stopword_only_text_is_dissimilar_to_everything() {
        assert_eq!(token_similarity("", "no live chat"), 0.0);
        assert_eq!(token_similarity("the of and", "the of and"), 0.0);
    }
}
