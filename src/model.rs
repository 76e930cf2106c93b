use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
}

/// List view of a book. `comment_count` is derived from the comment list
/// every time a summary is built and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub comment_count: usize,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        BookSummary {
            id: book.id,
            title: book.title.clone(),
            comment_count: book.comments.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_parse() {
        let id = BookId::new();
        let parsed: BookId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert!("testid123".parse::<BookId>().is_err());
        assert!("".parse::<BookId>().is_err());
        assert!("5f1b2c3d4e5f6a7b8c9d0e1f".parse::<BookId>().is_err());
    }

    #[test]
    fn test_summary_counts_comments() {
        let book = Book {
            id: BookId::new(),
            title: "Dune".to_string(),
            comments: vec!["first".to_string(), "".to_string()],
        };
        let summary = BookSummary::from(&book);
        assert_eq!(summary.id, book.id);
        assert_eq!(summary.title, "Dune");
        assert_eq!(summary.comment_count, 2);
    }
}
