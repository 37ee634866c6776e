use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use super::report::{
    AlternativeIngredient, FlaggedSubstitutes, IngredientAlternatives, ProductRecommendations,
    ScanReport, SuggestedSubstitutes,
};
use crate::config::ScanConfig;
use crate::ingredients::HealthScoreDatabase;
use crate::recommend::{
    InMemoryCatalog, ProductCandidate, ProductCatalog, ProductRecommender, ProductRecord,
    ProfileError, RecommendError, SkinProfile,
};
use crate::reference::ReferenceData;
use crate::scoring::{AnalysisError, ProductAnalysis, ScoringEngine};
use crate::source::{CatalogError, SourceStatus};
use crate::substitutes::{SubstituteCandidate, SubstituteFinder, SubstituteSource, SubstituteTable};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("invalid skin profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error("result limits must be at least 1")]
    InvalidMaxResults,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One scan: raw ingredients plus the optional shopper profile. Limits left
/// unset fall back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub ingredients: Vec<String>,
    pub profile: Option<SkinProfile>,
    pub max_substitutes: Option<usize>,
    pub max_products: Option<usize>,
}

impl ScanRequest {
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: SkinProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Service composing the scoring engine, substitute finder, and product
/// recommender over shared reference data.
pub struct ScanService<S, C> {
    dataset_version: String,
    engine: ScoringEngine,
    finder: SubstituteFinder<S>,
    recommender: ProductRecommender<C>,
    catalog: Arc<C>,
    config: ScanConfig,
}

impl ScanService<SubstituteTable, InMemoryCatalog> {
    pub fn from_reference(reference: &ReferenceData, config: ScanConfig) -> Self {
        Self::new(
            reference.version(),
            reference.database(),
            reference.substitutes(),
            reference.catalog(),
            config,
        )
    }
}

impl<S, C> ScanService<S, C>
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    pub fn new(
        dataset_version: impl Into<String>,
        database: Arc<HealthScoreDatabase>,
        substitutes: Arc<S>,
        catalog: Arc<C>,
        config: ScanConfig,
    ) -> Self {
        let engine = ScoringEngine::new(Arc::clone(&database));
        let finder = SubstituteFinder::new(substitutes, database);
        let recommender = ProductRecommender::new(Arc::clone(&catalog), engine.normalizer().clone());

        Self {
            dataset_version: dataset_version.into(),
            engine,
            finder,
            recommender,
            catalog,
            config,
        }
    }

    pub fn dataset_version(&self) -> &str {
        &self.dataset_version
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn analyze<T: AsRef<str>>(&self, raw: &[T]) -> Result<ProductAnalysis, AnalysisError> {
        self.engine.analyze(raw)
    }

    /// Scores the ingredients, then looks up substitutes for every distinct
    /// flagged ingredient and product alternatives in parallel.
    ///
    /// Only input problems fail the scan. Each lookup must finish within the
    /// configured timeout, measured from the moment the lookups start; late
    /// or failing lookups come back empty and marked unavailable.
    ///
    /// Lookups run on the blocking pool and are not cancelled on timeout: a
    /// late lookup keeps its thread until the source returns. Sources must
    /// bound their own I/O, or a source that never returns holds one blocking
    /// thread per flagged ingredient per scan.
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanReport, ScanError> {
        let max_substitutes = request
            .max_substitutes
            .unwrap_or(self.config.max_substitutes);
        let max_products = request.max_products.unwrap_or(self.config.max_products);
        if max_substitutes == 0 || max_products == 0 {
            return Err(ScanError::InvalidMaxResults);
        }
        if let Some(profile) = &request.profile {
            profile.validate()?;
        }

        let analysis = self.engine.analyze(&request.ingredients)?;
        let flagged = analysis.flagged_canonical_names();
        debug!(
            ingredients = analysis.ingredients.len(),
            flagged = flagged.len(),
            aggregate_score = analysis.aggregate_score,
            "ingredients scored"
        );

        let deadline = Instant::now() + self.config.lookup_timeout;
        let (substitutes, recommendations) = tokio::join!(
            self.collect_substitutes(&flagged, max_substitutes, deadline),
            self.collect_recommendations(&analysis, request.profile, max_products, deadline),
        );

        Ok(ScanReport {
            scanned_at: Utc::now(),
            dataset_version: self.dataset_version.clone(),
            analysis,
            substitutes,
            recommendations,
        })
    }

    /// Substitutes for each flagged ingredient of a raw list. Unlike
    /// [`scan`](Self::scan), an unreachable substitute source is an error.
    pub fn suggest_substitutes<T: AsRef<str>>(
        &self,
        raw: &[T],
        max_suggestions: Option<usize>,
    ) -> Result<Vec<SuggestedSubstitutes>, ScanError> {
        let max = max_suggestions.unwrap_or(self.config.max_substitutes);
        if max == 0 {
            return Err(ScanError::InvalidMaxResults);
        }
        let analysis = self.engine.analyze(raw)?;

        let mut seen = BTreeSet::new();
        let mut suggestions = Vec::new();
        for ingredient in &analysis.flagged {
            if !seen.insert(ingredient.canonical_name.as_str()) {
                continue;
            }
            suggestions.push(SuggestedSubstitutes {
                ingredient: ingredient.canonical_name.clone(),
                score: ingredient.score,
                substitutes: self
                    .finder
                    .find_substitutes(&ingredient.canonical_name, max)?,
            });
        }
        Ok(suggestions)
    }

    pub fn recommend(
        &self,
        flagged: &BTreeSet<String>,
        profile: &SkinProfile,
        max_results: Option<usize>,
    ) -> Result<Vec<ProductCandidate>, RecommendError> {
        self.recommender.recommend(
            flagged,
            profile,
            max_results.unwrap_or(self.config.max_products),
        )
    }

    /// Substitutes for a single ingredient, each paired with the catalog
    /// products that contain it.
    pub fn ingredient_alternatives(&self, name: &str) -> Result<IngredientAlternatives, CatalogError> {
        let canonical = self.engine.normalizer().normalize(name);
        let record = self.engine.database().lookup(&canonical);
        let substitutes = self
            .finder
            .find_substitutes(&canonical, self.config.max_substitutes)?;
        let products = self.catalog.products()?;

        let alternatives = substitutes
            .into_iter()
            .map(|substitute| {
                let product_ids = products
                    .iter()
                    .filter(|product| product.ingredients.contains(&substitute.name))
                    .map(|product| product.product_id.clone())
                    .collect();
                AlternativeIngredient {
                    substitute,
                    product_ids,
                }
            })
            .collect();

        Ok(IngredientAlternatives {
            ingredient: canonical,
            score: record.map(|record| record.score),
            category: record.map(|record| record.category),
            alternatives,
        })
    }

    pub fn products(&self) -> Result<Arc<[ProductRecord]>, CatalogError> {
        self.catalog.products()
    }

    pub fn product(&self, product_id: &str) -> Result<Option<ProductRecord>, CatalogError> {
        self.catalog.product(product_id)
    }

    async fn collect_substitutes(
        &self,
        flagged: &[String],
        max_results: usize,
        deadline: Instant,
    ) -> Vec<FlaggedSubstitutes> {
        // spawn every lookup before awaiting any so they share the deadline
        let pending: Vec<(String, JoinHandle<Result<Vec<SubstituteCandidate>, CatalogError>>)> =
            flagged
                .iter()
                .map(|ingredient| {
                    let finder = self.finder.clone();
                    let name = ingredient.clone();
                    let handle = tokio::task::spawn_blocking(move || {
                        finder.find_substitutes(&name, max_results)
                    });
                    (ingredient.clone(), handle)
                })
                .collect();

        let mut results = Vec::with_capacity(pending.len());
        for (ingredient, handle) in pending {
            let (status, substitutes) = match self.await_lookup(handle, deadline).await {
                Ok(substitutes) => (SourceStatus::Available, substitutes),
                Err(error) => {
                    warn!(%ingredient, %error, "substitute lookup degraded");
                    (SourceStatus::unavailable(&error), Vec::new())
                }
            };
            results.push(FlaggedSubstitutes {
                ingredient,
                status,
                substitutes,
            });
        }
        results
    }

    async fn collect_recommendations(
        &self,
        analysis: &ProductAnalysis,
        profile: Option<SkinProfile>,
        max_results: usize,
        deadline: Instant,
    ) -> ProductRecommendations {
        let skipped = |reason: &str| ProductRecommendations {
            status: SourceStatus::skipped(reason),
            products: Vec::new(),
        };
        let Some(profile) = profile else {
            return skipped("no skin profile supplied");
        };
        let flagged = analysis.flagged_set();
        if flagged.is_empty() {
            return skipped("no flagged ingredients");
        }

        let recommender = self.recommender.clone();
        let reference = analysis.canonical_names();
        let handle = tokio::task::spawn_blocking(move || {
            recommender.recommend_with_reference(&flagged, &profile, &reference, max_results)
        });

        let outcome = match timeout_at(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(CatalogError::Unavailable(join_error.to_string()).into()),
            Err(_) => Err(CatalogError::TimedOut(self.config.lookup_timeout).into()),
        };

        match outcome {
            Ok(products) => ProductRecommendations {
                status: SourceStatus::Available,
                products,
            },
            Err(RecommendError::Catalog(error)) => {
                warn!(%error, "product recommendation degraded");
                ProductRecommendations {
                    status: SourceStatus::unavailable(&error),
                    products: Vec::new(),
                }
            }
            Err(error) => skipped(&error.to_string()),
        }
    }

    async fn await_lookup<T>(
        &self,
        handle: JoinHandle<Result<T, CatalogError>>,
        deadline: Instant,
    ) -> Result<T, CatalogError> {
        match timeout_at(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(CatalogError::Unavailable(join_error.to_string())),
            Err(_) => Err(CatalogError::TimedOut(self.config.lookup_timeout)),
        }
    }
}
