//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::is_foreign_key_violation;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get all books
    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY book_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get books whose author contains the given substring (case-insensitive)
    pub async fn get_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author ILIKE '%' || $1 || '%' ORDER BY book_id",
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by exact name
    pub async fn get_by_name(&self, book_name: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_name = $1")
            .bind(book_name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with name '{}' not found", book_name)))
    }

    /// Create a new book; the store assigns the identity
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (book_name, author, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&book.book_name)
        .bind(&book.author)
        .bind(&book.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an existing book
    pub async fn update(&self, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET book_name = $1, author = $2, description = $3
            WHERE book_id = $4
            RETURNING *
            "#,
        )
        .bind(&book.book_name)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book.book_id)))
    }

    /// Delete a book. Returns false when no book with that id exists.
    /// Fails with Conflict when the book is still referenced by a loan.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(format!("Book {} is still referenced by a loan", id))
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
