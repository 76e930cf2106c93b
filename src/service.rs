use crate::api::{AddCommentRequest, CreateBookRequest};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{Book, BookId, BookSummary};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBook {
    pub id: BookId,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Deleted,
    DeletedAll(u64),
}

impl Confirmation {
    pub fn message(&self) -> &'static str {
        match self {
            Confirmation::Deleted => "delete successful",
            Confirmation::DeletedAll(_) => "complete delete successful",
        }
    }
}

/// Shapes store results into client views. Holds nothing but the store
/// handle, so every answer reflects the store at call time.
#[derive(Clone)]
pub struct CatalogService {
    store: Store,
}

impl CatalogService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list_summaries(&self) -> CatalogResult<Vec<BookSummary>> {
        let books = self.store.list_books().await?;
        Ok(books.iter().map(BookSummary::from).collect())
    }

    pub async fn get_detail(&self, id: &str) -> CatalogResult<Book> {
        self.store.get_book(id).await
    }

    pub async fn create(&self, req: CreateBookRequest) -> CatalogResult<CreatedBook> {
        let title = req
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CatalogError::missing_field("title"))?;

        let book = self.store.create_book(&title).await?;
        Ok(CreatedBook {
            id: book.id,
            title: book.title,
        })
    }

    /// An absent `comment` is rejected; an empty one is stored as-is.
    pub async fn add_comment(&self, id: &str, req: AddCommentRequest) -> CatalogResult<Book> {
        let comment = req.comment.ok_or_else(|| CatalogError::missing_field("comment"))?;
        self.store.append_comment(id, &comment).await
    }

    pub async fn remove(&self, id: &str) -> CatalogResult<Confirmation> {
        self.store.delete_book(id).await?;
        Ok(Confirmation::Deleted)
    }

    pub async fn remove_all(&self) -> CatalogResult<Confirmation> {
        let count = self.store.delete_all().await?;
        Ok(Confirmation::DeletedAll(count))
    }
}
