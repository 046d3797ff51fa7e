pub mod config;
pub mod error;

use anyhow::Result;
use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use recipe_core::persist::IndexPaths;
use recipe_core::{EngineHandle, RecipeEngine, ResolvedResult, Retrieval};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use config::ServerSettings;
pub use error::ApiError;

pub const NO_MATCHES_MESSAGE: &str = "No matching recipes found.";

#[derive(Deserialize)]
pub struct RecipeParams {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default = "default_diet")]
    pub diet: String,
}
fn default_diet() -> String { "all".to_string() }

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<RecipeCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeCard {
    pub title: String,
    pub image_url: String,
    pub ingredients: String,
    pub dietary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub recipe_name: String,
    pub steps: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub settings: Arc<ServerSettings>,
}

/// Load the index bundle and build the router. Any index error is fatal.
pub fn build_app(settings: ServerSettings) -> Result<Router> {
    let engine = RecipeEngine::open(&IndexPaths::new(&settings.index_dir), &settings.engine_config())?;
    tracing::info!(num_docs = engine.corpus().len(), index = %settings.index_dir.display(), "engine ready");
    let state = AppState { engine: EngineHandle::new(engine), settings: Arc::new(settings) };
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    // CORS: comma-separated origin list, or allow Any by default
    let cors = match state.settings.cors_allow_origin.as_deref() {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let static_files = ServeDir::new(&state.settings.static_dir);
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recipes", get(recipes_query).post(recipes_form))
        .route("/process/:recipe_name", get(process_handler))
        .route("/images/:category/:filename", get(image_handler))
        .route("/admin/reload", post(reload_handler))
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn recipes_query(State(state): State<AppState>, Query(params): Query<RecipeParams>) -> Result<Json<RecipesResponse>, ApiError> {
    recommend(state, params).await
}

pub async fn recipes_form(State(state): State<AppState>, Form(params): Form<RecipeParams>) -> Result<Json<RecipesResponse>, ApiError> {
    recommend(state, params).await
}

async fn recommend(state: AppState, params: RecipeParams) -> Result<Json<RecipesResponse>, ApiError> {
    let engine = state.engine.current();
    let ingredients = params.ingredients.trim().to_string();
    let diet = params.diet;
    // Image existence checks touch the filesystem.
    let retrieval = tokio::task::spawn_blocking(move || engine.retrieve(&ingredients, &diet)).await?;

    let response = match retrieval {
        Retrieval::Matches(results) => RecipesResponse {
            status: "ok".into(),
            message: None,
            results: results.into_iter().map(|r| card(&state.settings, r)).collect(),
        },
        Retrieval::NoMatches => RecipesResponse {
            status: "no_matches".into(),
            message: Some(NO_MATCHES_MESSAGE.into()),
            results: Vec::new(),
        },
    };
    Ok(Json(response))
}

fn card(settings: &ServerSettings, result: ResolvedResult) -> RecipeCard {
    RecipeCard {
        image_url: result.image.url(&settings.image_url_prefix, &settings.default_image_url),
        title: result.title,
        ingredients: result.ingredients,
        dietary: result.dietary_tag.to_string(),
    }
}

pub async fn process_handler(State(state): State<AppState>, Path(recipe_name): Path<String>) -> Json<ProcessResponse> {
    let steps = state.engine.current().lookup_instructions(&recipe_name);
    Json(ProcessResponse { recipe_name, steps })
}

/// Re-checks the file at serve time; a stale resolution still yields 404.
pub async fn image_handler(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
    req: Request,
) -> Result<Response, ApiError> {
    let path = state
        .engine
        .current()
        .images()
        .path_of(&category, &filename)
        .ok_or_else(|| ApiError::NotFound("image not found".into()))?;
    let resp = match ServeFile::new(&path).oneshot(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    };
    if resp.status() == StatusCode::NOT_FOUND {
        tracing::warn!(path = %path.display(), "image not found");
        return Err(ApiError::NotFound("image not found".into()));
    }
    Ok(resp.into_response())
}

/// Build a new engine from disk and swap it in. Requests already holding the
/// old engine finish against it.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let settings = state.settings.clone();
    let engine = tokio::task::spawn_blocking(move || {
        RecipeEngine::open(&IndexPaths::new(&settings.index_dir), &settings.engine_config())
    })
    .await??;
    let num_docs = engine.corpus().len();
    state.engine.replace(engine);
    tracing::info!(num_docs, "engine reloaded");
    Ok(Json(serde_json::json!({ "status": "reloaded", "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.settings.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
