//! Similarity scoring between tab feature vectors.

use super::features::FeatureVector;

const DOMAIN_WEIGHT: f64 = 0.5;
const CATEGORY_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.2;

/// Weighted similarity in `[0, 1]`: domain match, category match, and
/// keyword overlap scaled by the larger keyword set.
pub fn similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let mut score = 0.0;

    if a.domain == b.domain {
        score += DOMAIN_WEIGHT;
    }

    if a.category == b.category {
        score += CATEGORY_WEIGHT;
    }

    let larger = a.keywords.len().max(b.keywords.len());
    if larger > 0 {
        let shared = a
            .keywords
            .iter()
            .filter(|keyword| b.keywords.contains(*keyword))
            .count();
        score += KEYWORD_WEIGHT * shared as f64 / larger as f64;
    }

    score
}

/// Mean pairwise similarity over all distinct member pairs.
///
/// Callers only hand this clusters of two or more, so at least one pair
/// exists; a hypothetical singleton scores a full 1.0.
pub fn cluster_confidence(members: &[FeatureVector]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0u32;
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            total += similarity(&members[i], &members[j]);
            pairs += 1;
        }
    }
    if pairs > 0 {
        total / f64::from(pairs)
    } else {
        1.0
    }
}
