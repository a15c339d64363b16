//! JSON route handlers.
//!
//! Upstream failures on search-shaped routes surface as empty result
//! payloads ("no results found"), never as 5xx; over-capacity actions
//! surface as 409 with a count-based message.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::limits;
use crate::models::{FilterSet, Paper, SortKey};
use crate::page;
use crate::query::{self, ComposedQuery, SearchPage};
use crate::store::{Group, PinToggle};

use super::AppState;

type SharedState = State<Arc<AppState>>;

/// Assemble all API routes.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/works/{id}", get(get_work))
        .route("/api/works/{id}/citing", get(citing))
        .route("/api/works/{id}/references", get(references))
        .route("/api/intersect/citing", post(intersect_citing))
        .route("/api/intersect/references", post(intersect_references))
        .route("/api/suggest/{kind}", get(suggest))
        .route("/api/pins", get(list_pins).delete(clear_pins))
        .route("/api/pins/toggle", post(toggle_pin))
        .route("/api/pins/refresh", post(refresh_pins))
        .route("/api/pins/move", post(move_pin))
        .route("/api/pins/reorder", post(reorder_pins))
        .route("/api/pins/groups", post(create_group))
        .route("/api/pins/groups/{id}", delete(delete_group))
        .route("/api/pins/groups/{id}/rename", post(rename_group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    filters: FilterSet,
    #[serde(default)]
    sort: SortKey,
    #[serde(default = "first_page")]
    page: usize,
}

const fn first_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    total: i64,
    total_pages: usize,
    page_window: Vec<usize>,
    results: Vec<Paper>,
}

impl PageResponse {
    fn from_search(page: SearchPage, current: usize) -> Self {
        let total_pages = page::total_pages(page.total.max(0) as usize, limits::PAGE_SIZE);
        Self {
            total: page.total,
            total_pages,
            page_window: page::page_window(current, total_pages, limits::PAGE_WINDOW),
            results: page.results,
        }
    }
}

async fn search(
    State(state): SharedState,
    Json(request): Json<SearchRequest>,
) -> Result<Json<PageResponse>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(err) = request.filters.validate() {
        return Err((StatusCode::CONFLICT, Json(json!({ "error": err.to_user_message() }))));
    }

    let descriptor =
        query::compose_search(&request.query, &request.filters, request.sort, request.page);
    let result = state.composer.execute(&ComposedQuery::Request(descriptor)).await;
    Ok(Json(PageResponse::from_search(result, request.page)))
}

async fn get_work(
    State(state): SharedState,
    Path(id): Path<String>,
) -> Result<Json<Paper>, StatusCode> {
    match state.client.get_work(&id).await {
        Ok(work) => Ok(Json(Paper::from(&work))),
        Err(crate::error::ClientError::NotFound { .. }) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            tracing::warn!(id, error = %err, "work lookup failed");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageParam {
    #[serde(default = "first_page")]
    page: usize,
}

async fn citing(
    State(state): SharedState,
    Path(id): Path<String>,
    Query(param): Query<PageParam>,
) -> Json<PageResponse> {
    let descriptor = query::compose_citing_of(&id, param.page);
    let result = state.composer.execute(&ComposedQuery::Request(descriptor)).await;
    Json(PageResponse::from_search(result, param.page))
}

async fn references(
    State(state): SharedState,
    Path(id): Path<String>,
    Query(param): Query<PageParam>,
) -> Json<serde_json::Value> {
    let result = state.composer.referenced_by(&id, param.page).await;
    let total_pages = page::total_pages(result.total, limits::PAGE_SIZE);
    Json(json!({
        "total": result.total,
        "totalPages": total_pages,
        "pageWindow": page::page_window(param.page, total_pages, limits::PAGE_WINDOW),
        "results": result.results,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntersectRequest {
    ids: Vec<String>,
    #[serde(default = "first_page")]
    page: usize,
}

async fn intersect_citing(
    state: SharedState,
    request: Json<IntersectRequest>,
) -> Result<Json<PageResponse>, (StatusCode, Json<serde_json::Value>)> {
    intersect(state, request, true).await
}

async fn intersect_references(
    state: SharedState,
    request: Json<IntersectRequest>,
) -> Result<Json<PageResponse>, (StatusCode, Json<serde_json::Value>)> {
    intersect(state, request, false).await
}

async fn intersect(
    State(state): SharedState,
    Json(request): Json<IntersectRequest>,
    citing: bool,
) -> Result<Json<PageResponse>, (StatusCode, Json<serde_json::Value>)> {
    // The composer's intersection contract needs at least two papers.
    if request.ids.len() < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "intersection needs at least two paper ids" })),
        ));
    }

    let composed = if citing {
        state.composer.citing_all(&request.ids).await
    } else {
        state.composer.references_all(&request.ids).await
    };

    let composed = match composed {
        ComposedQuery::Request(descriptor) => {
            ComposedQuery::Request(descriptor.with_page(request.page))
        }
        ComposedQuery::Empty => ComposedQuery::Empty,
    };

    let result = state.composer.execute(&composed).await;
    Ok(Json(PageResponse::from_search(result, request.page)))
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
}

async fn suggest(
    State(state): SharedState,
    Path(kind): Path<String>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let per_page = limits::PAGE_SIZE;
    let value = match kind.as_str() {
        "authors" => state
            .client
            .search_authors(&params.q, per_page)
            .await
            .map(|r| serde_json::to_value(r).unwrap_or_default()),
        "institutions" => state
            .client
            .search_institutions(&params.q, per_page)
            .await
            .map(|r| serde_json::to_value(r).unwrap_or_default()),
        "topics" => state
            .client
            .search_topics(&params.q, per_page)
            .await
            .map(|r| serde_json::to_value(r).unwrap_or_default()),
        "journals" => state
            .client
            .search_journals(&params.q, per_page)
            .await
            .map(|r| serde_json::to_value(r).unwrap_or_default()),
        _ => return Err(StatusCode::NOT_FOUND),
    };

    // Entity lookups degrade to an empty suggestion list.
    Ok(Json(value.unwrap_or_else(|err| {
        tracing::warn!(kind, error = %err, "suggestion lookup degraded to empty");
        json!([])
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupView {
    id: String,
    name: String,
    papers: Vec<Paper>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinsView {
    count: usize,
    ungrouped: Vec<Paper>,
    groups: Vec<GroupView>,
}

async fn list_pins(State(state): SharedState) -> Json<PinsView> {
    let store = state.store.read().await;

    let groups = store
        .groups()
        .iter()
        .map(|Group { id, name }| GroupView {
            id: id.clone(),
            name: name.clone(),
            papers: store.bucket_papers(&Some(id.clone())).into_iter().cloned().collect(),
        })
        .collect();

    Json(PinsView {
        count: store.len(),
        ungrouped: store.bucket_papers(&None).into_iter().cloned().collect(),
        groups,
    })
}

async fn toggle_pin(
    State(state): SharedState,
    Json(paper): Json<Paper>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let mut store = state.store.write().await;
    match store.toggle_pin(paper) {
        Ok(PinToggle::Pinned) => Ok(Json(json!({ "status": "pinned" }))),
        Ok(PinToggle::Unpinned) => Ok(Json(json!({ "status": "unpinned" }))),
        Err(err) => {
            Err((StatusCode::CONFLICT, Json(json!({ "error": err.to_user_message() }))))
        }
    }
}

async fn clear_pins(State(state): SharedState) -> StatusCode {
    state.store.write().await.clear_pins();
    StatusCode::NO_CONTENT
}

async fn refresh_pins(State(state): SharedState) -> Json<serde_json::Value> {
    let mut store = state.store.write().await;
    match store.refresh(&state.client).await {
        Ok(updated) => Json(json!({ "refreshed": true, "updated": updated })),
        Err(err) => {
            // Local copies are retained unmodified.
            tracing::warn!(error = %err, "pin refresh failed, keeping cached metadata");
            Json(json!({ "refreshed": false, "updated": 0 }))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest {
    paper_id: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    index: Option<usize>,
}

async fn move_pin(State(state): SharedState, Json(request): Json<MoveRequest>) -> StatusCode {
    let mut store = state.store.write().await;
    let moved = match request.index {
        Some(index) => store.move_paper_to_group_at(&request.paper_id, request.group, index),
        None => store.move_paper_to_group(&request.paper_id, request.group),
    };
    if moved { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest {
    #[serde(default)]
    group: Option<String>,
    from: usize,
    to: usize,
}

async fn reorder_pins(State(state): SharedState, Json(request): Json<ReorderRequest>) -> StatusCode {
    let mut store = state.store.write().await;
    if store.reorder_in_group(&request.group, request.from, request.to) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

#[derive(Debug, Deserialize)]
struct GroupRequest {
    name: String,
}

async fn create_group(
    State(state): SharedState,
    Json(request): Json<GroupRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut store = state.store.write().await;
    store
        .create_group(&request.name)
        .map(|id| Json(json!({ "id": id })))
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)
}

async fn rename_group(
    State(state): SharedState,
    Path(id): Path<String>,
    Json(request): Json<GroupRequest>,
) -> StatusCode {
    let mut store = state.store.write().await;
    if store.rename_group(&id, &request.name) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn delete_group(State(state): SharedState, Path(id): Path<String>) -> StatusCode {
    let mut store = state.store.write().await;
    if store.delete_group(&id) { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}
