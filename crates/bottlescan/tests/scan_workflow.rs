use std::collections::BTreeSet;
use std::time::Duration;

use bottlescan::config::ScanConfig;
use bottlescan::ingredients::parse_label_text;
use bottlescan::recommend::{InMemoryCatalog, ProductRecommender, SkinProfile};
use bottlescan::reference::ReferenceData;
use bottlescan::scan::{ScanRequest, ScanService};
use bottlescan::scoring::{ScoringEngine, FLAG_THRESHOLD};
use bottlescan::source::SourceStatus;
use bottlescan::substitutes::SubstituteFinder;

fn reference() -> ReferenceData {
    ReferenceData::bundled().expect("seed datasets load")
}

#[test]
fn seed_product_scores_sixty_with_three_flags() {
    let engine = ScoringEngine::new(reference().database());
    let analysis = engine
        .analyze(&[
            "Aqua",
            "Glycerin",
            "Niacinamide",
            "Butylene Glycol",
            "Phenoxyethanol",
            "Parfum",
            "Methylparaben",
        ])
        .expect("analysis");

    assert_eq!(analysis.aggregate_score, 60);
    assert_eq!(analysis.interpretation, "Generally Okay");
    let flagged: Vec<_> = analysis
        .flagged
        .iter()
        .map(|ingredient| ingredient.canonical_name.as_str())
        .collect();
    assert_eq!(flagged, vec!["phenoxyethanol", "parfum", "methylparaben"]);
    assert!(analysis
        .flagged
        .iter()
        .all(|ingredient| ingredient.score < FLAG_THRESHOLD));
}

#[test]
fn methylparaben_substitutes_are_ranked_by_score() {
    let reference = reference();
    let finder = SubstituteFinder::new(reference.substitutes(), reference.database());
    let substitutes = finder
        .find_substitutes("methylparaben", 2)
        .expect("substitutes");

    let ranked: Vec<_> = substitutes
        .iter()
        .map(|candidate| (candidate.name.as_str(), candidate.score))
        .collect();
    assert_eq!(ranked, vec![("leucidal liquid", 75), ("sodium benzoate", 65)]);
}

#[test]
fn recommendation_without_skin_match_is_empty() {
    let reference = reference();
    let recommender: ProductRecommender<InMemoryCatalog> =
        ProductRecommender::new(reference.catalog(), reference.normalizer());
    let flagged = BTreeSet::from(["parfum".to_string()]);

    let products = recommender
        .recommend(&flagged, &SkinProfile::new(["mature"], ["wrinkles"]), 5)
        .expect("recommendation");
    assert!(products.is_empty());
}

#[tokio::test]
async fn label_text_scan_runs_end_to_end() {
    let service = ScanService::from_reference(
        &reference(),
        ScanConfig {
            lookup_timeout: Duration::from_secs(2),
            max_substitutes: 2,
            max_products: 3,
        },
    );
    let label = "Gentle Foaming Wash 200ml\n\
                 INGREDIENTS: Water, Sodium Lauryl Sulfate, Glycerin, Fragrance, Propylparaben.";
    let request = ScanRequest::new(parse_label_text(label))
        .with_profile(SkinProfile::new(["sensitive"], ["sensitive"]));

    let report = service.scan(request).await.expect("scan succeeds");

    let flagged: Vec<_> = report
        .substitutes
        .iter()
        .map(|entry| entry.ingredient.as_str())
        .collect();
    assert_eq!(
        flagged,
        vec!["sodium lauryl sulfate", "parfum", "propylparaben"]
    );
    assert!(report
        .substitutes
        .iter()
        .all(|entry| entry.substitutes.len() <= 2));
    assert_eq!(
        report.substitutes[0].substitutes[0].name,
        "decyl glucoside"
    );

    assert_eq!(report.recommendations.status, SourceStatus::Available);
    assert!(report.recommendations.products.len() <= 3);
    assert!(report
        .recommendations
        .products
        .iter()
        .all(|product| product.skin_type.contains("sensitive")));
    let scores: Vec<f64> = report
        .recommendations
        .products
        .iter()
        .map(|product| product.substitute_score)
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}
