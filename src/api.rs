use crate::model::{Book, BookId, BookSummary};
use crate::service::CreatedBook;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookSummaryResponse {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    #[serde(rename = "commentcount")]
    pub comment_count: usize,
}

impl From<BookSummary> for BookSummaryResponse {
    fn from(summary: BookSummary) -> Self {
        BookSummaryResponse {
            id: summary.id,
            title: summary.title,
            comment_count: summary.comment_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        BookResponse {
            id: book.id,
            title: book.title,
            comments: book.comments,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookResponse {
    pub message: String,
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
}

impl From<CreatedBook> for CreateBookResponse {
    fn from(created: CreatedBook) -> Self {
        CreateBookResponse {
            message: "new book created".to_owned(),
            id: created.id,
            title: created.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fields_are_optional() {
        let req: CreateBookRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());

        let req: AddCommentRequest = serde_json::from_str(r#"{"comment": ""}"#).unwrap();
        assert_eq!(req.comment.as_deref(), Some(""));
    }

    #[test]
    fn test_summary_wire_names() {
        let id = BookId::new();
        let body = serde_json::to_value(BookSummaryResponse::from(BookSummary {
            id,
            title: "Ulysses".to_string(),
            comment_count: 3,
        }))
        .unwrap();

        assert_eq!(body["_id"], id.to_string());
        assert_eq!(body["title"], "Ulysses");
        assert_eq!(body["commentcount"], 3);
    }
}
