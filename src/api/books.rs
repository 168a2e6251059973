//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::BasicAuth;

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_all_books(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.get_all().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Get books by author substring
#[utoipa::path(
    get,
    path = "/books/author/{author}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("author" = String, Path, description = "Author name or part of it")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>)
    )
)]
pub async fn get_books_by_author(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(author): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.get_by_author(&author).await?;
    Ok(Json(books))
}

/// Get book by exact name
#[utoipa::path(
    get,
    path = "/books/name/{name}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("name" = String, Path, description = "Exact book name")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_by_name(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(name): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_name(&name).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    book.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.books.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book. The path id must match the body id.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "ID mismatch or invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    if id != book.book_id {
        return Err(AppError::Validation("ID mismatch".to_string()));
    }
    book.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.books.update_book(book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still referenced by a loan")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.services.books.delete_book(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Book with id {} not found", id)))
    }
}
