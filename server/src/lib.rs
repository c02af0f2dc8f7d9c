use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ircore::{
    BooleanOptions, BooleanSearchEngine, Corpus, Document, IndexConfig, InMemoryCorpus, InMemoryInvertedIndex,
    InvertedIndex, RankerKind, SearchOptions, SimpleSearchEngine,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub match_threshold: Option<f64>,
    pub hit_count: Option<usize>,
    #[serde(default)]
    pub ranker: RankerKind,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub hits: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub score: f64,
    pub document: Document,
}

#[derive(Deserialize)]
pub struct BooleanParams {
    pub q: String,
    pub optimize: Option<bool>,
}

#[derive(Serialize)]
pub struct BooleanResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub documents: Vec<Document>,
}

#[derive(Deserialize)]
pub struct TermsParams {
    pub q: String,
}

type ApiError = (StatusCode, Json<Value>);

/// Corpus and index, shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<InMemoryCorpus>,
    pub index: Arc<InMemoryInvertedIndex>,
}

impl AppState {
    pub fn new(corpus: InMemoryCorpus, config: &IndexConfig) -> Self {
        let index = config.build(&corpus);
        Self { corpus: Arc::new(corpus), index: Arc::new(index) }
    }
}

pub fn build_app(corpus_path: impl AsRef<std::path::Path>, config: &IndexConfig) -> Result<Router> {
    let corpus = InMemoryCorpus::load(corpus_path)?;
    Ok(router(AppState::new(corpus, config)))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/boolean", get(boolean_handler))
        .route("/terms", get(terms_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let defaults = SearchOptions::default();
    let options = SearchOptions {
        match_threshold: params.match_threshold.unwrap_or(defaults.match_threshold),
        hit_count: params.hit_count.unwrap_or(defaults.hit_count),
    };
    let corpus: &dyn Corpus = state.corpus.as_ref();
    let index: &dyn InvertedIndex = state.index.as_ref();
    let engine = SimpleSearchEngine::new(corpus, index);
    let mut ranker = params.ranker.create(corpus, index);
    let hits: Vec<SearchHit> = engine
        .evaluate(&params.q, &options, ranker.as_mut())
        .map(|hit| SearchHit { score: hit.score, document: hit.document.clone() })
        .collect();
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(query = %params.q, hits = hits.len(), took_s, "ranked search");
    Json(SearchResponse { query: params.q, took_s, hits })
}

pub async fn boolean_handler(
    State(state): State<AppState>,
    Query(params): Query<BooleanParams>,
) -> Result<Json<BooleanResponse>, ApiError> {
    let start = Instant::now();
    let options = BooleanOptions { optimize: params.optimize.unwrap_or(BooleanOptions::default().optimize) };
    let engine = BooleanSearchEngine::new(state.corpus.as_ref(), state.index.as_ref());
    let documents: Vec<Document> = match engine.evaluate(&params.q, &options) {
        Ok(documents) => documents.cloned().collect(),
        Err(e) => {
            tracing::warn!(query = %params.q, error = %e, "rejected boolean query");
            return Err((StatusCode::BAD_REQUEST, Json(json!({ "query": params.q, "error": e.to_string() }))));
        }
    };
    let took_s = start.elapsed().as_secs_f64();
    Ok(Json(BooleanResponse { query: params.q, took_s, total_hits: documents.len(), documents }))
}

pub async fn terms_handler(State(state): State<AppState>, Query(params): Query<TermsParams>) -> Json<Value> {
    let index = state.index.as_ref();
    let terms: Vec<Value> = index
        .get_terms(&params.q)
        .map(|term| {
            json!({
                "term": term,
                "document_frequency": index.get_document_frequency(&term),
                "collection_frequency": index.get_collection_frequency(&term),
            })
        })
        .collect();
    Json(json!({ "text": params.q, "terms": terms }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Json<Document>, ApiError> {
    match state.corpus.get_document(doc_id) {
        Some(document) => Ok(Json(document.clone())),
        None => Err((StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))),
    }
}
