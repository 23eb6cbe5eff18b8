//! Catalog management and the borrow/return state machine

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput},
        history::BorrowRecord,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List the catalog
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Add a new book to the catalog
    pub async fn add_book(&self, input: BookInput) -> AppResult<Book> {
        let (title, author, isbn) = input.validated()?;

        if self.repository.books.isbn_exists(&isbn, None).await? {
            return Err(AppError::Conflict(
                "Book with this ISBN already exists".to_string(),
            ));
        }

        self.repository.books.create(&title, &author, &isbn).await
    }

    /// Update an existing book's bibliographic fields
    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        let (title, author, isbn) = input.validated()?;

        if self.repository.books.isbn_exists(&isbn, Some(id)).await? {
            return Err(AppError::Conflict(
                "Book with this ISBN already exists".to_string(),
            ));
        }

        self.repository
            .books
            .update(id, &title, &author, &isbn)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Remove a book from the catalog
    pub async fn remove_book(&self, id: i32) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    /// Borrow a book for the given user
    pub async fn borrow_book(&self, book_id: i32, user_id: i32) -> AppResult<BorrowRecord> {
        let record = self.repository.history.borrow(book_id, user_id).await?;
        tracing::info!("Book {} borrowed by user {}", book_id, user_id);
        Ok(record)
    }

    /// Return a book on behalf of the given user
    pub async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<()> {
        match self.repository.history.return_book(book_id, user_id).await? {
            Some(record) => {
                tracing::info!("Book {} returned by user {} (loan {})", book_id, user_id, record.id);
            }
            None => {
                // The caller never borrowed this copy; the book is freed
                // anyway but the original borrower's record stays open.
                tracing::warn!(
                    "Book {} returned by user {} without an outstanding loan record",
                    book_id,
                    user_id
                );
            }
        }
        Ok(())
    }
}
