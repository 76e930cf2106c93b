use libsql::Connection;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Book, BookId};

/// Durable, identity-addressed storage of books.
///
/// Each book is one row in `books`; its comments live in the same row as a
/// JSON array so that an append is a single-row update. Every method is a
/// single statement, which gives per-record atomicity without taking any
/// in-process lock.
#[derive(Clone)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn parse_id(id: &str) -> CatalogResult<BookId> {
        id.parse::<BookId>().map_err(|_| CatalogError::not_found(id))
    }

    fn row_to_book(row: &libsql::Row) -> CatalogResult<Book> {
        let id: String = row.get(0)?;
        let comments: String = row.get(2)?;

        Ok(Book {
            id: id
                .parse::<BookId>()
                .map_err(|e| CatalogError::StorageUnavailable(Box::new(e)))?,
            title: row.get(1)?,
            comments: serde_json::from_str(&comments)?,
        })
    }

    pub async fn create_book(&self, title: &str) -> CatalogResult<Book> {
        if title.trim().is_empty() {
            return Err(CatalogError::missing_field("title"));
        }

        let query = r#"
            INSERT INTO books (id, title)
            VALUES (?, ?)
            RETURNING id, title, comments
        "#;

        let id = BookId::new();
        let mut rows = self
            .conn
            .query(query, libsql::params![id.to_string(), title])
            .await?;

        match rows.next().await? {
            Some(row) => Self::row_to_book(&row),
            None => Err(CatalogError::StorageUnavailable(
                format!("insert of book {} returned no row", id).into(),
            )),
        }
    }

    /// All books in insertion order. An empty catalog is an empty vec.
    pub async fn list_books(&self) -> CatalogResult<Vec<Book>> {
        let query = r#"
            SELECT id, title, comments
            FROM books
            ORDER BY rowid
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut books = Vec::new();

        while let Some(row) = rows.next().await? {
            books.push(Self::row_to_book(&row)?);
        }

        Ok(books)
    }

    pub async fn get_book(&self, id: &str) -> CatalogResult<Book> {
        let book_id = Self::parse_id(id)?;
        let query = r#"
            SELECT id, title, comments
            FROM books WHERE id = ?
        "#;

        let mut rows = self
            .conn
            .query(query, libsql::params![book_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(row) => Self::row_to_book(&row),
            None => Err(CatalogError::not_found(id)),
        }
    }

    /// Pushes `comment` onto the end of the book's list and returns the
    /// updated book. The push and the read-back are one `UPDATE ... RETURNING`,
    /// so concurrent appends on the same id are serialized by the engine.
    pub async fn append_comment(&self, id: &str, comment: &str) -> CatalogResult<Book> {
        let book_id = Self::parse_id(id)?;
        let query = r#"
            UPDATE books
            SET comments = json_insert(comments, '$[#]', ?),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING id, title, comments
        "#;

        let mut rows = self
            .conn
            .query(query, libsql::params![comment, book_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(row) => Self::row_to_book(&row),
            None => Err(CatalogError::not_found(id)),
        }
    }

    pub async fn delete_book(&self, id: &str) -> CatalogResult<()> {
        let book_id = Self::parse_id(id)?;
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![book_id.to_string()])
            .await?;

        if deleted == 0 {
            return Err(CatalogError::not_found(id));
        }
        Ok(())
    }

    /// Removes every book and returns how many rows went away.
    pub async fn delete_all(&self) -> CatalogResult<u64> {
        Ok(self.conn.execute("DELETE FROM books", ()).await?)
    }
}
