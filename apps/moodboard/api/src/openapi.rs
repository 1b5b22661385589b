use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa::{Modify, OpenApi};

/// Root API documentation, served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Moodboard API",
        version = "0.1.0",
        description = "Index image captions as embeddings, search them, and blend items into new suggestions"
    ),
    modifiers(&MoodboardPaths)
)]
pub struct ApiDoc;

/// Moodboard routes are mounted at the root, so their docs are merged rather than nested.
struct MoodboardPaths;

impl Modify for MoodboardPaths {
    fn modify(&self, openapi: &mut OpenApiSpec) {
        openapi.merge(domain_moodboard::ApiDoc::openapi());
    }
}
