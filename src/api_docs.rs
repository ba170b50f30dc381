use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::pages::home,
        api::pages::about,
        api::pages::contact,
        api::pages::navigation,
        api::pages::search,
        api::catalog::catalog,
        api::catalog::artwork_detail,
        api::collections::list_collections,
        api::collections::collection_detail,
        api::blog::list_posts,
        api::blog::post_detail,
        api::auth::login,
    ),
    components(
        schemas(
            api::error::ErrorBody,
            api::auth::LoginRequest,
            api::auth::LoginResponse,
        )
    ),
    tags(
        (name = "artfolio", description = "Artist portfolio and blog API")
    )
)]
pub struct ApiDoc;
