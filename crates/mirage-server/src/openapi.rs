use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mirage API",
        version = "0.1.0",
        description = "Website clone synthesizer: fetch a site, distill it, and reconstruct it with an LLM."
    ),
    paths(
        crate::routes::clone_site,
        crate::routes::history,
        crate::routes::preview,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::CloneRequest,
        crate::dto::CloneResponse,
        crate::dto::CloneMetadata,
        crate::dto::HistoryResponse,
        crate::dto::PreviewResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "clone", description = "Clone synthesis"),
        (name = "history", description = "Clone history"),
        (name = "preview", description = "Stored clone retrieval"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
