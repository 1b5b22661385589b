use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use axum_helpers::{
    AppError, ValidatedJson,
    errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse},
};
use utoipa::OpenApi;

use crate::error::MoodboardResult;
use crate::models::{
    BlendParams, BlendRequest, HealthResponse, IndexRequest, IndexResponse, ItemIn, ListParams,
    ListResponse, ListedItem, SearchParams, SearchResponse, SearchResponseItem,
};
use crate::service::MoodboardService;

pub const TAG: &str = "moodboard";

/// OpenAPI documentation for the moodboard endpoints
#[derive(OpenApi)]
#[openapi(
    paths(health, index_items, search, blend, list_items),
    components(
        schemas(
            ItemIn,
            HealthResponse,
            IndexResponse,
            SearchResponse,
            SearchResponseItem,
            ListResponse,
            ListedItem
        ),
        responses(NotFoundResponse, BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = TAG, description = "Index, search and blend moodboard items"))
)]
pub struct ApiDoc;

type SharedService = Arc<MoodboardService>;

/// Routes for all moodboard endpoints, mounted at the root
pub fn router(service: MoodboardService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/index", post(index_items))
        .route("/search", get(search))
        .route("/blend", post(blend))
        .route("/items", get(list_items))
        .with_state(Arc::new(service))
}

/// Liveness check that touches the vector store once
#[utoipa::path(
    get,
    path = "/health",
    tag = TAG,
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn health(State(service): State<SharedService>) -> MoodboardResult<Json<HealthResponse>> {
    Ok(Json(service.health().await?))
}

/// Embed and upsert a batch of items
#[utoipa::path(
    post,
    path = "/index",
    tag = TAG,
    request_body = Vec<ItemIn>,
    responses(
        (status = 200, description = "Items indexed", body = IndexResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn index_items(
    State(service): State<SharedService>,
    ValidatedJson(request): ValidatedJson<IndexRequest>,
) -> MoodboardResult<Json<IndexResponse>> {
    Ok(Json(service.index_items(request.items).await?))
}

/// Free text similarity search
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchParams),
    responses(
        (status = 200, description = "Ranked hits, closest first", body = SearchResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search(
    State(service): State<SharedService>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> MoodboardResult<Json<SearchResponse>> {
    Ok(Json(service.search(&params.q, params.k).await?))
}

/// Items closest to the centroid of the given items, excluding the inputs
#[utoipa::path(
    post,
    path = "/blend",
    tag = TAG,
    params(BlendParams),
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Ranked hits, closest first", body = SearchResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn blend(
    State(service): State<SharedService>,
    WithRejection(Query(params), _): WithRejection<Query<BlendParams>, AppError>,
    ValidatedJson(request): ValidatedJson<BlendRequest>,
) -> MoodboardResult<Json<SearchResponse>> {
    Ok(Json(service.blend(request.ids, params.k).await?))
}

/// First `n` stored items
#[utoipa::path(
    get,
    path = "/items",
    tag = TAG,
    params(ListParams),
    responses(
        (status = 200, description = "Stored items", body = ListResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items(
    State(service): State<SharedService>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, AppError>,
) -> MoodboardResult<Json<ListResponse>> {
    Ok(Json(service.list_items(params.n).await?))
}
