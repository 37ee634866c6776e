use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{ScanError, ScanRequest, ScanService};
use crate::ingredients::parse_label_text;
use crate::recommend::{ProductCatalog, ProfileError, RecommendError, SkinProfile};
use crate::scoring::AnalysisError;
use crate::source::CatalogError;
use crate::substitutes::SubstituteSource;

/// Ingredients arrive either as an ordered list or as raw label text.
#[derive(Debug, Default, Deserialize)]
pub struct IngredientInput {
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
}

impl IngredientInput {
    fn into_ingredients(self) -> Vec<String> {
        match (self.ingredients, self.text) {
            (Some(ingredients), _) => ingredients,
            (None, Some(text)) => parse_label_text(&text),
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanPayload {
    #[serde(flatten)]
    pub input: IngredientInput,
    #[serde(default)]
    pub skin_type: Option<Vec<String>>,
    #[serde(default)]
    pub concerns: Option<Vec<String>>,
    #[serde(default)]
    pub max_substitutes: Option<usize>,
    #[serde(default)]
    pub max_products: Option<usize>,
}

impl ScanPayload {
    fn into_request(self) -> Result<ScanRequest, ProfileError> {
        let profile = match (self.skin_type, self.concerns) {
            (None, None) => None,
            (skin_types, concerns) => Some(SkinProfile::from_parts(skin_types, concerns)?),
        };
        Ok(ScanRequest {
            ingredients: self.input.into_ingredients(),
            profile,
            max_substitutes: self.max_substitutes,
            max_products: self.max_products,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubstitutesPayload {
    #[serde(flatten)]
    pub input: IngredientInput,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationPayload {
    #[serde(default)]
    pub flagged_ingredients: Vec<String>,
    #[serde(default)]
    pub skin_type: Option<Vec<String>>,
    #[serde(default)]
    pub concerns: Option<Vec<String>>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Router exposing the scan pipeline and its individual stages.
pub fn scan_router<S, C>(service: Arc<ScanService<S, C>>) -> Router
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    Router::new()
        .route("/api/v1/analyze", post(analyze_handler::<S, C>))
        .route("/api/v1/scan", post(scan_handler::<S, C>))
        .route("/api/v1/substitutes", post(substitutes_handler::<S, C>))
        .route(
            "/api/v1/recommendations",
            post(recommendations_handler::<S, C>),
        )
        .route(
            "/api/v1/ingredients/:name/alternatives",
            get(alternatives_handler::<S, C>),
        )
        .route("/api/v1/products", get(products_handler::<S, C>))
        .route(
            "/api/v1/products/:product_id",
            get(product_handler::<S, C>),
        )
        .with_state(service)
}

pub(crate) async fn analyze_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    axum::Json(input): axum::Json<IngredientInput>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    match service.analyze(&input.into_ingredients()) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => analysis_error(error),
    }
}

pub(crate) async fn scan_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    axum::Json(payload): axum::Json<ScanPayload>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    let request = match payload.into_request() {
        Ok(request) => request,
        Err(error) => return scan_error(ScanError::InvalidProfile(error)),
    };
    match service.scan(request).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => scan_error(error),
    }
}

pub(crate) async fn substitutes_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    axum::Json(payload): axum::Json<SubstitutesPayload>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    let ingredients = payload.input.into_ingredients();
    match service.suggest_substitutes(&ingredients, payload.max_suggestions) {
        Ok(suggestions) => {
            let payload = json!({
                "flagged_count": suggestions.len(),
                "suggestions": suggestions,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => scan_error(error),
    }
}

pub(crate) async fn recommendations_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    axum::Json(payload): axum::Json<RecommendationPayload>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    let profile = match SkinProfile::from_parts(payload.skin_type, payload.concerns) {
        Ok(profile) => profile,
        Err(error) => return recommend_error(RecommendError::InvalidProfile(error)),
    };
    let flagged: BTreeSet<String> = payload.flagged_ingredients.into_iter().collect();

    match service.recommend(&flagged, &profile, payload.max_results) {
        Ok(products) => {
            let payload = json!({
                "count": products.len(),
                "products": products,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => recommend_error(error),
    }
}

pub(crate) async fn alternatives_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    Path(name): Path<String>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    match service.ingredient_alternatives(&name) {
        Ok(alternatives) => (StatusCode::OK, axum::Json(alternatives)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn products_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    match service.products() {
        Ok(products) => {
            let payload = json!({
                "count": products.len(),
                "products": &*products,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn product_handler<S, C>(
    State(service): State<Arc<ScanService<S, C>>>,
    Path(product_id): Path<String>,
) -> Response
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    match service.product(&product_id) {
        Ok(Some(product)) => (StatusCode::OK, axum::Json(product)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("product '{product_id}' not found"),
        ),
        Err(error) => catalog_error(error),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

fn analysis_error(error: AnalysisError) -> Response {
    error_response(StatusCode::BAD_REQUEST, error.to_string())
}

fn catalog_error(error: CatalogError) -> Response {
    error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
}

fn scan_error(error: ScanError) -> Response {
    match error {
        ScanError::Analysis(error) => analysis_error(error),
        ScanError::InvalidProfile(_) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        ScanError::InvalidMaxResults => error_response(StatusCode::BAD_REQUEST, error.to_string()),
        ScanError::Catalog(error) => catalog_error(error),
    }
}

fn recommend_error(error: RecommendError) -> Response {
    match error {
        RecommendError::InvalidProfile(_) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        RecommendError::NoFlaggedIngredients | RecommendError::InvalidMaxResults => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        RecommendError::Catalog(error) => catalog_error(error),
    }
}
