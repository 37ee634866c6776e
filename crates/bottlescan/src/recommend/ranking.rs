use super::catalog::ProductRecord;
use super::profile::SkinProfile;
use std::collections::BTreeSet;

const OVERLAP_WEIGHT: f64 = 0.35;
const CONCERN_WEIGHT: f64 = 0.30;
const SKIN_WEIGHT: f64 = 0.15;
const QUALITY_WEIGHT: f64 = 0.20;

/// Similarity of a candidate product to what the shopper scanned and asked
/// for, in `[0, 1]` with four decimals.
///
/// `reference` holds the canonical non-flagged ingredients of the scanned
/// product; when empty the overlap term contributes nothing.
pub(crate) fn substitute_score(
    product: &ProductRecord,
    profile: &SkinProfile,
    reference: &BTreeSet<String>,
) -> f64 {
    let overlap = jaccard(reference, &product.ingredients.iter().cloned().collect());
    let concern = match_ratio(&profile.concerns, &product.concerns);
    let skin = match_ratio(&profile.skin_types, &product.skin_type);
    let quality = 0.6 * (product.rating / 5.0) + 0.4 * (f64::from(product.health_score) / 100.0);

    let blended = OVERLAP_WEIGHT * overlap
        + CONCERN_WEIGHT * concern
        + SKIN_WEIGHT * skin
        + QUALITY_WEIGHT * quality;
    (blended.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    if left.is_empty() {
        return 0.0;
    }
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

fn match_ratio(requested: &BTreeSet<String>, offered: &BTreeSet<String>) -> f64 {
    if requested.is_empty() {
        return 0.0;
    }
    requested.intersection(offered).count() as f64 / requested.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(ingredients: &[&str], rating: f64, health_score: u8) -> ProductRecord {
        ProductRecord {
            product_id: "p1".to_string(),
            brand: "Acme".to_string(),
            name: "Gel".to_string(),
            category: "serum".to_string(),
            skin_type: BTreeSet::from(["oily".to_string()]),
            concerns: BTreeSet::from(["acne".to_string(), "pores".to_string()]),
            ingredients: ingredients.iter().map(|name| name.to_string()).collect(),
            health_score,
            average_price: Decimal::new(999, 2),
            currency: "USD".to_string(),
            url: String::new(),
            rating,
            review_count: 0,
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn perfect_match_scores_one() {
        let product = product(&["aqua", "glycerin"], 5.0, 100);
        let profile = SkinProfile::new(["oily"], ["acne"]);
        let score = substitute_score(&product, &profile, &set(&["aqua", "glycerin"]));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn missing_reference_and_concerns_contribute_nothing() {
        let product = product(&["aqua"], 5.0, 100);
        let profile = SkinProfile::new(["oily"], Vec::<String>::new());
        let score = substitute_score(&product, &profile, &BTreeSet::new());
        assert_eq!(score, 0.35);
    }

    #[test]
    fn partial_matches_blend_by_weight() {
        let product = product(&["aqua", "niacinamide"], 4.0, 80);
        let profile = SkinProfile::new(["oily", "dry"], ["acne", "redness"]);
        // overlap 1/3, concern 1/2, skin 1/2, quality 0.6*0.8 + 0.4*0.8
        let score = substitute_score(&product, &profile, &set(&["aqua", "glycerin"]));
        assert_eq!(score, 0.5017);
    }
}
