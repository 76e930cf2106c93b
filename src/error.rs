use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("ValidationError: {0}")]
    Validation(String),
    /// Carries the id exactly as the caller supplied it, malformed or not.
    #[error("NotFound: no book exists with id {0}")]
    NotFound(String),
    #[error("StorageUnavailable: {0}")]
    StorageUnavailable(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl CatalogError {
    pub fn missing_field(field: &str) -> Self {
        CatalogError::Validation(format!("missing required field {}", field))
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        CatalogError::NotFound(id.into())
    }

    pub fn status(&self) -> StatusCode {
        use CatalogError::*;
        match self {
            Validation(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<libsql::Error> for CatalogError {
    fn from(error: libsql::Error) -> Self {
        CatalogError::StorageUnavailable(Box::new(error))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        CatalogError::StorageUnavailable(Box::new(error))
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        use CatalogError::*;
        match &self {
            Validation(msg) => {
                tracing::warn!("rejected request: {}", msg);
                (self.status(), msg.clone()).into_response()
            }
            NotFound(id) => {
                tracing::warn!(book_id = %id, "book not found");
                (self.status(), "no book exists").into_response()
            }
            StorageUnavailable(_) => {
                tracing::error!(error = %crate::unpack_error(&self), "storage round trip failed");
                (self.status(), "storage unavailable").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CatalogError::missing_field("title").status(), StatusCode::BAD_REQUEST);
        assert_eq!(CatalogError::not_found("x").status(), StatusCode::NOT_FOUND);

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = CatalogError::StorageUnavailable(Box::new(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(crate::unpack_error(&err), "StorageUnavailable: refused: refused");
    }

    #[test]
    fn test_missing_field_message() {
        let err = CatalogError::missing_field("comment");
        assert_eq!(err.to_string(), "ValidationError: missing required field comment");
    }
}
