//! Lexicon scorer for marketing-copy assertiveness.
//!
//! Scores positioning text on an assertive-vs-hedged axis; the change
//! detector compares scores across scan versions to spot messaging shifts.

/// Marketing-tone word weights.
///
/// Keys are lowercase single words. Positive weights are assertive,
/// dominance-style copy; negative weights are hedged, modest copy. The
/// final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Assertive signals
    ("best", 0.4),
    ("leading", 0.4),
    ("leader", 0.4),
    ("fastest", 0.4),
    ("unmatched", 0.5),
    ("guaranteed", 0.5),
    ("revolutionary", 0.5),
    ("dominant", 0.5),
    ("proven", 0.3),
    ("trusted", 0.3),
    ("premier", 0.4),
    ("ultimate", 0.4),
    ("powerful", 0.3),
    ("enterprise", 0.2),
    ("award", 0.3),
    ("winning", 0.3),
    ("unrivaled", 0.5),
    ("definitive", 0.4),
    // Hedged signals
    ("simple", -0.3),
    ("affordable", -0.3),
    ("basic", -0.4),
    ("lightweight", -0.3),
    ("easy", -0.2),
    ("friendly", -0.2),
    ("small", -0.3),
    ("budget", -0.4),
    ("starter", -0.4),
    ("modest", -0.4),
    ("humble", -0.5),
    ("alternative", -0.3),
    ("helper", -0.3),
];

/// Score a text string using the tone lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps the
/// result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn tone_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}
