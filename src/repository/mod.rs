//! Repository layer for database operations

pub mod books;
pub mod history;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding the database connection pool.
/// Handed to the services by the process entry point; no module-level
/// globals anywhere.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub history: history::HistoryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            history: history::HistoryRepository::new(pool.clone()),
            pool,
        }
    }
}
