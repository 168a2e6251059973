//! Book loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;
use super::person::Person;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub book_loan_id: i32,
    pub person_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
}

impl Loan {
    /// A loan is overdue when it is still out and its due date has passed.
    /// Computed against the supplied clock, never stored.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned && now > self.due_date
    }
}

/// Loan with person and book eager-loaded for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub book_loan_id: i32,
    pub person_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub is_overdue: bool,
    pub person: Option<Person>,
    pub book: Option<Book>,
}

impl LoanDetails {
    pub fn from_loan(loan: Loan, person: Option<Person>, book: Option<Book>) -> Self {
        let now = Utc::now();
        Self {
            book_loan_id: loan.book_loan_id,
            person_id: loan.person_id,
            book_id: loan.book_id,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            is_returned: loan.is_returned,
            is_overdue: loan.is_overdue_at(now),
            person,
            book,
        }
    }
}

/// Create loan request. Dates are recorded verbatim; the server does not
/// clamp or reorder them.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub person_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Full loan update request, carrying the id that must match the path
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLoan {
    pub book_loan_id: i32,
    pub person_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
}

impl UpdateLoan {
    /// The is_returned flag must be set exactly when a return date is
    /// present; the storage layer enforces the same rule.
    pub fn return_state_consistent(&self) -> bool {
        self.is_returned == self.return_date.is_some()
    }
}

/// Return request body; the date defaults to "now" when absent
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReturnLoan {
    pub return_date: Option<DateTime<Utc>>,
}
