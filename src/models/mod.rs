//! Data models for Biblio

pub mod book;
pub mod loan;
pub mod person;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanDetails};
pub use person::Person;
