use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};

use crate::handler::{self, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            get(handler::get_books)
                .post(handler::create_book)
                .delete(handler::delete_books),
        )
        .route(
            "/books/:id",
            get(handler::get_book)
                .post(handler::add_comment)
                .delete(handler::delete_book),
        )
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Full application router. `public_dir`, when given, is served under
/// `/public` and its `index.html` answers `/`.
pub fn app(state: AppState, public_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let no_cache = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ));

    let mut router = Router::new()
        .route("/health", get(handler::healthcheck))
        .nest("/api", routes());

    if let Some(dir) = public_dir {
        router = router
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/public", ServeDir::new(dir));
    }

    router
        .fallback(not_found)
        .layer(no_cache)
        .layer(cors)
        .with_state(state)
}
