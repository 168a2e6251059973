//! Book catalog service

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
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

    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.get_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Books whose author contains the given substring
    pub async fn get_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.repository.books.get_by_author(author).await
    }

    /// Book with exactly the given name
    pub async fn get_by_name(&self, book_name: &str) -> AppResult<Book> {
        self.repository.books.get_by_name(book_name).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Book {} created: '{}'", created.book_id, created.book_name);
        Ok(created)
    }

    pub async fn update_book(&self, book: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(&book).await
    }

    /// Delete a book; false when it does not exist, Conflict when a loan
    /// still references it
    pub async fn delete_book(&self, id: i32) -> AppResult<bool> {
        self.repository.books.delete(id).await
    }
}
