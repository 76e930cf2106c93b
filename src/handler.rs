use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use tracing::info;

use crate::api::{AddCommentRequest, BookResponse, BookSummaryResponse, CreateBookRequest, CreateBookResponse};
use crate::db::Database;
use crate::error::CatalogResult;
use crate::service::CatalogService;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        let store = Store::new(db.connection().clone());
        AppState {
            db,
            catalog: CatalogService::new(store),
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_books(State(state): State<AppState>) -> CatalogResult<Json<Vec<BookSummaryResponse>>> {
    let summaries = state.catalog.list_summaries().await?;
    info!(count = summaries.len(), "got books");
    Ok(Json(summaries.into_iter().map(BookSummaryResponse::from).collect()))
}

/// A missing or unparsable body is treated like a body without a title.
pub async fn create_book(
    State(state): State<AppState>,
    payload: Option<Json<CreateBookRequest>>,
) -> CatalogResult<Json<CreateBookResponse>> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let created = state.catalog.create(req).await?;
    info!(book_id = %created.id, "new book created");
    Ok(Json(created.into()))
}

pub async fn delete_books(State(state): State<AppState>) -> CatalogResult<&'static str> {
    let confirmation = state.catalog.remove_all().await?;
    info!(?confirmation, "complete delete");
    Ok(confirmation.message())
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> CatalogResult<Json<BookResponse>> {
    let book = state.catalog.get_detail(&id).await?;
    info!(book_id = %book.id, "book found");
    Ok(Json(book.into()))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<AddCommentRequest>>,
) -> CatalogResult<Json<BookResponse>> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let book = state.catalog.add_comment(&id, req).await?;
    info!(book_id = %book.id, comments = book.comments.len(), "comment added");
    Ok(Json(book.into()))
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> CatalogResult<&'static str> {
    let confirmation = state.catalog.remove(&id).await?;
    info!(book_id = %id, "book deleted");
    Ok(confirmation.message())
}
