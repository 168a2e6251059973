//! Business logic services

pub mod books;
pub mod loans;
pub mod persons;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub persons: persons::PersonsService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            persons: persons::PersonsService::new(repository.clone()),
            loans: loans::LoansService::new(repository),
        }
    }
}
