//! Borrow ledger repository.
//!
//! The borrow and return transitions run as single transactions whose
//! first statement is a conditional status update, so two concurrent
//! transitions on the same book cannot both succeed: the loser's update
//! matches zero rows and is rejected without a separate racing read.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::history::BorrowRecord,
};

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Mark a book borrowed and append the outstanding loan record.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE books SET status = 'BORROWED' WHERE id = $1 AND status = 'AVAILABLE'",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if exists {
                AppError::Conflict("Book is already borrowed".to_string())
            } else {
                AppError::NotFound("Book not found".to_string())
            });
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_history (user_id, book_id, borrow_date)
            VALUES ($1, $2, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Mark a book available again and stamp the caller's outstanding loan
    /// record for it.
    ///
    /// Returns `None` when the caller has no outstanding record for the
    /// book; the status transition commits regardless, matching the
    /// historical behavior where any borrower's return frees the book.
    pub async fn return_book(
        &self,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE books SET status = 'AVAILABLE' WHERE id = $1 AND status = 'BORROWED'",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if exists {
                AppError::Conflict("Book is already available".to_string())
            } else {
                AppError::NotFound("Book not found".to_string())
            });
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_history
            SET return_date = NOW()
            WHERE id = (
                SELECT id FROM borrow_history
                WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL
                ORDER BY borrow_date DESC
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// All loan records, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_history ORDER BY borrow_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Loan records for one user, most recent first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_history WHERE user_id = $1 ORDER BY borrow_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
