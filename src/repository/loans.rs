//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{CreateLoan, Loan, LoanDetails, UpdateLoan},
        person::Person,
    },
};

use super::{is_check_violation, is_foreign_key_violation, is_unique_violation};

/// Shared SELECT fragment eager-loading person and book for a loan row
const DETAILS_SELECT: &str = r#"
    SELECT l.book_loan_id, l.person_id, l.book_id,
           l.loan_date, l.due_date, l.return_date, l.is_returned,
           p.name AS person_name, p.last_name AS person_last_name,
           b.book_name, b.author, b.description
    FROM book_loans l
    JOIN persons p ON l.person_id = p.person_id
    JOIN books b ON l.book_id = b.book_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID (no relations)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM book_loans WHERE book_loan_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get all loans with person and book eager-loaded
    pub async fn get_all_with_details(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY l.book_loan_id", DETAILS_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Get a single loan with person and book eager-loaded
    pub async fn get_with_details(&self, id: i32) -> AppResult<LoanDetails> {
        let row = sqlx::query(&format!("{} WHERE l.book_loan_id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        Ok(details_from_row(&row))
    }

    /// Get active (not returned) loans for a person
    pub async fn get_active_by_person(&self, person_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE l.person_id = $1 AND NOT l.is_returned ORDER BY l.book_loan_id",
            DETAILS_SELECT
        ))
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Get all loans for a person, most recent loan date first
    pub async fn get_history_by_person(&self, person_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE l.person_id = $1 ORDER BY l.loan_date DESC",
            DETAILS_SELECT
        ))
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Get active (not returned) loans for a book
    pub async fn get_active_by_book(&self, book_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE l.book_id = $1 AND NOT l.is_returned ORDER BY l.book_loan_id",
            DETAILS_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Get loans that are still out past their due date, evaluated against
    /// the database clock at query time
    pub async fn get_overdue(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE NOT l.is_returned AND l.due_date < NOW() ORDER BY l.due_date",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Get returned loans, most recent return first
    pub async fn get_returned(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE l.is_returned ORDER BY l.return_date DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// A book is available when it has no active loan
    pub async fn is_book_available(&self, book_id: i32) -> AppResult<bool> {
        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_loans WHERE book_id = $1 AND NOT is_returned)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(!on_loan)
    }

    /// Return the loan's is_returned flag, or false when the loan does not
    /// exist (the two cases are deliberately not distinguished)
    pub async fn is_returned(&self, loan_id: i32) -> AppResult<bool> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT is_returned FROM book_loans WHERE book_loan_id = $1")
                .bind(loan_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }

    /// Create a new loan. Starts not returned with no return date; the given
    /// dates are recorded verbatim. A partial unique index on (book_id) for
    /// active loans rejects a second open loan for the same book even when
    /// two requests race past the availability check.
    pub async fn create(&self, loan: &CreateLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO book_loans (person_id, book_id, loan_date, due_date, return_date, is_returned)
            VALUES ($1, $2, $3, $4, NULL, FALSE)
            RETURNING *
            "#,
        )
        .bind(loan.person_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(format!(
                    "Person {} or book {} not found",
                    loan.person_id, loan.book_id
                ))
            } else if is_unique_violation(&e) {
                AppError::Conflict(format!("Book {} already has an active loan", loan.book_id))
            } else {
                AppError::Database(e)
            }
        })
    }

    /// Update all fields of an existing loan
    pub async fn update(&self, loan: &UpdateLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE book_loans
            SET person_id = $1, book_id = $2, loan_date = $3, due_date = $4,
                return_date = $5, is_returned = $6
            WHERE book_loan_id = $7
            RETURNING *
            "#,
        )
        .bind(loan.person_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.is_returned)
        .bind(loan.book_loan_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(format!(
                    "Person {} or book {} not found",
                    loan.person_id, loan.book_id
                ))
            } else if is_unique_violation(&e) {
                AppError::Conflict(format!("Book {} already has an active loan", loan.book_id))
            } else if is_check_violation(&e) {
                AppError::Validation(
                    "return_date must be set exactly when is_returned is true".to_string(),
                )
            } else {
                AppError::Database(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan.book_loan_id)))
    }

    /// Mark a loan as returned with the given date. Returns false when the
    /// loan does not exist or was already returned; the second return of a
    /// loan never alters the recorded return date.
    pub async fn return_loan(&self, loan_id: i32, return_date: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_loans
            SET return_date = $1, is_returned = TRUE
            WHERE book_loan_id = $2 AND NOT is_returned
            "#,
        )
        .bind(return_date)
        .bind(loan_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a loan. Returns false when no loan with that id exists.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_loans WHERE book_loan_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Build a LoanDetails from a joined row
fn details_from_row(row: &PgRow) -> LoanDetails {
    let loan = Loan {
        book_loan_id: row.get("book_loan_id"),
        person_id: row.get("person_id"),
        book_id: row.get("book_id"),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        is_returned: row.get("is_returned"),
    };

    let person = Person {
        person_id: loan.person_id,
        name: row.get("person_name"),
        last_name: row.get("person_last_name"),
    };

    let book = Book {
        book_id: loan.book_id,
        book_name: row.get("book_name"),
        author: row.get("author"),
        description: row.get("description"),
    };

    LoanDetails::from_loan(loan, Some(person), Some(book))
}
