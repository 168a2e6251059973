//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub book_name: String,
    pub author: String,
    pub description: String,
}

/// Create book request. The store assigns the identity; any client-supplied
/// id is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "book_name must be 1-200 characters"))]
    pub book_name: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 1000, message = "description must be 1-1000 characters"))]
    pub description: String,
}

/// Update book request, carrying the id that must match the path
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub book_id: i32,
    #[validate(length(min = 1, max = 200, message = "book_name must be 1-200 characters"))]
    pub book_name: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 1000, message = "description must be 1-1000 characters"))]
    pub description: String,
}
