//! HTTP 路由

use std::path::Path;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vassar_application::command_bus::CommandBus;
use vassar_application::context::AppContext;
use vassar_application::person::{
    FindPersonByName, GetGenealogyTree, GetGraphData, GraphDto, LoadPerson, PersonDto,
    PersonInput, RelatePeople,
};
use vassar_application::query_bus::QueryBus;
use vassar_domain::value_object::Postnomial;

use crate::error::ApiError;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 构建路由；给出静态目录时在 `/public` 下提供浏览器资源
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/people", get(find_person))
        .route("/people/create", post(create_person))
        .route("/people/relationships", post(relate_people))
        .route("/graph-data", get(graph_data))
        .route("/tree", get(genealogy_tree));

    let router = match static_dir {
        Some(dir) => router.nest_service("/public", ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn context(headers: &HeaderMap) -> AppContext {
    AppContext::builder()
        .maybe_correlation_id(
            headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        )
        .build()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindParams {
    first_name: String,
    last_name: String,
    postnomial: Option<String>,
}

#[tracing::instrument(skip(state, headers))]
async fn find_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<FindParams>, QueryRejection>,
) -> Result<Json<PersonDto>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let postnomial = params
        .postnomial
        .as_deref()
        .map(str::parse::<Postnomial>)
        .transpose()?;

    let query = FindPersonByName {
        first_name: params.first_name,
        last_name: params.last_name,
        postnomial,
    };
    let name = format!("{} {}", query.first_name, query.last_name);
    match state.queries.dispatch(&context(&headers), query).await? {
        Some(person) => Ok(Json(person)),
        None => Err(ApiError::NotFound(format!("no person named {name}"))),
    }
}

#[tracing::instrument(skip_all)]
async fn create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<PersonDto>, ApiError> {
    let Json(person) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let stored = state
        .commands
        .dispatch(&context(&headers), LoadPerson { person })
        .await?;
    Ok(Json(stored))
}

#[tracing::instrument(skip_all)]
async fn relate_people(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RelatePeople>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(cmd) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.commands.dispatch(&context(&headers), cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all)]
async fn graph_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GraphDto>, ApiError> {
    Ok(Json(
        state
            .queries
            .dispatch(&context(&headers), GetGraphData)
            .await?,
    ))
}

#[tracing::instrument(skip_all)]
async fn genealogy_tree(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GraphDto>, ApiError> {
    Ok(Json(
        state
            .queries
            .dispatch(&context(&headers), GetGenealogyTree)
            .await?,
    ))
}
