//! Loan lifecycle service

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, UpdateLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get all loans with person and book eager-loaded
    pub async fn get_all(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_all_with_details().await
    }

    /// Get a loan with details by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_with_details(id).await
    }

    /// Get active loans for a person
    pub async fn get_active_by_person(&self, person_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_active_by_person(person_id).await
    }

    /// Get a person's full loan history, most recent first
    pub async fn get_history_by_person(&self, person_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_history_by_person(person_id).await
    }

    /// Get active loans for a book
    pub async fn get_active_by_book(&self, book_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_active_by_book(book_id).await
    }

    /// Get all overdue loans, evaluated against the clock at query time
    pub async fn get_overdue(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_overdue().await
    }

    /// Get all returned loans, most recent return first
    pub async fn get_returned(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_returned().await
    }

    /// A book is available when no loan for it is still out
    pub async fn is_book_available(&self, book_id: i32) -> AppResult<bool> {
        self.repository.loans.is_book_available(book_id).await
    }

    /// Whether the loan has been returned; false when the loan is unknown
    pub async fn is_returned(&self, loan_id: i32) -> AppResult<bool> {
        self.repository.loans.is_returned(loan_id).await
    }

    /// Create a new loan. The book must be available; the storage-level
    /// unique index on active loans backs this check under concurrency.
    pub async fn create_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        if !self.repository.loans.is_book_available(loan.book_id).await? {
            return Err(AppError::Conflict(format!(
                "Book {} is currently on loan and not available",
                loan.book_id
            )));
        }

        let created = self.repository.loans.create(&loan).await?;
        tracing::info!(
            "Loan {} created: person {} borrowed book {}",
            created.book_loan_id,
            created.person_id,
            created.book_id
        );
        Ok(created)
    }

    /// Update all fields of a loan
    pub async fn update_loan(&self, loan: UpdateLoan) -> AppResult<Loan> {
        self.repository.loans.update(&loan).await
    }

    /// Return a loan. The date defaults to now. Returns false when the loan
    /// is unknown or already returned; a second return never overwrites the
    /// first recorded date.
    pub async fn return_loan(
        &self,
        loan_id: i32,
        return_date: Option<DateTime<Utc>>,
    ) -> AppResult<(bool, DateTime<Utc>)> {
        let date = return_date.unwrap_or_else(Utc::now);
        let returned = self.repository.loans.return_loan(loan_id, date).await?;
        if returned {
            tracing::info!("Loan {} returned on {}", loan_id, date);
        }
        Ok((returned, date))
    }

    /// Delete a loan; false when it does not exist
    pub async fn delete_loan(&self, id: i32) -> AppResult<bool> {
        self.repository.loans.delete(id).await
    }
}
