//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, LoanDetails, ReturnLoan, UpdateLoan},
};

use super::BasicAuth;

/// Availability check response
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub book_id: i32,
    pub is_available: bool,
}

/// Return-status check response
#[derive(Serialize, ToSchema)]
pub struct ReturnedStatusResponse {
    pub loan_id: i32,
    pub is_returned: bool,
}

/// Successful return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub loan_id: i32,
    pub return_date: DateTime<Utc>,
}

/// List all loans with person and book details
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "List of loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_all_loans(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_all().await?;
    Ok(Json(loans))
}

/// Get loan by ID with person and book details
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_by_id(id).await?;
    Ok(Json(loan))
}

/// Get active loans for a person
#[utoipa::path(
    get,
    path = "/loans/person/{person_id}/active",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("person_id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Active loans for the person", body = Vec<LoanDetails>)
    )
)]
pub async fn get_active_loans_by_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(person_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_active_by_person(person_id).await?;
    Ok(Json(loans))
}

/// Get a person's full loan history, most recent loan first
#[utoipa::path(
    get,
    path = "/loans/person/{person_id}/history",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("person_id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Loan history for the person", body = Vec<LoanDetails>)
    )
)]
pub async fn get_loan_history_by_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(person_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_history_by_person(person_id).await?;
    Ok(Json(loans))
}

/// Get active loans for a book
#[utoipa::path(
    get,
    path = "/loans/book/{book_id}/active",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Active loans for the book", body = Vec<LoanDetails>)
    )
)]
pub async fn get_active_loans_by_book(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_active_by_book(book_id).await?;
    Ok(Json(loans))
}

/// Check whether a book is available for loan
#[utoipa::path(
    get,
    path = "/loans/book/{book_id}/available",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Availability of the book", body = AvailabilityResponse)
    )
)]
pub async fn is_book_available(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(book_id): Path<i32>,
) -> AppResult<Json<AvailabilityResponse>> {
    let is_available = state.services.loans.is_book_available(book_id).await?;
    Ok(Json(AvailabilityResponse {
        book_id,
        is_available,
    }))
}

/// Get overdue loans, evaluated against the clock at query time
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>)
    )
)]
pub async fn get_overdue_loans(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_overdue().await?;
    Ok(Json(loans))
}

/// Get returned loans, most recent return first
#[utoipa::path(
    get,
    path = "/loans/returned",
    tag = "loans",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Returned loans", body = Vec<LoanDetails>)
    )
)]
pub async fn get_returned_loans(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_returned().await?;
    Ok(Json(loans))
}

/// Check whether a loan has been returned. An unknown loan id reports
/// false, the same as an active loan.
#[utoipa::path(
    get,
    path = "/loans/{id}/returned",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Return status of the loan", body = ReturnedStatusResponse)
    )
)]
pub async fn is_loan_returned(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnedStatusResponse>> {
    let is_returned = state.services.loans.is_returned(id).await?;
    Ok(Json(ReturnedStatusResponse {
        loan_id: id,
        is_returned,
    }))
}

/// Create a new loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("basic_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 404, description = "Person or book not found"),
        (status = 409, description = "Book already on loan")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Json(loan): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let created = state.services.loans.create_loan(loan).await?;
    Ok((
        StatusCode::CREATED,
        Json(LoanDetails::from_loan(created, None, None)),
    ))
}

/// Update an existing loan. The path id must match the body id.
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = LoanDetails),
        (status = 400, description = "ID mismatch"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn update_loan(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
    Json(loan): Json<UpdateLoan>,
) -> AppResult<Json<LoanDetails>> {
    if id != loan.book_loan_id {
        return Err(AppError::Validation("ID mismatch".to_string()));
    }
    if !loan.return_state_consistent() {
        return Err(AppError::Validation(
            "return_date must be set exactly when is_returned is true".to_string(),
        ));
    }

    let updated = state.services.loans.update_loan(loan).await?;
    Ok(Json(LoanDetails::from_loan(updated, None, None)))
}

/// Return a loaned book. The return date defaults to now when the body
/// omits it.
#[utoipa::path(
    put,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Loan not found or already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
    body: Option<Json<ReturnLoan>>,
) -> AppResult<Json<ReturnResponse>> {
    let requested_date = body.and_then(|Json(b)| b.return_date);
    let (returned, return_date) = state.services.loans.return_loan(id, requested_date).await?;

    if !returned {
        return Err(AppError::BadRequest(format!(
            "Unable to return book. Loan {} not found or already returned",
            id
        )));
    }

    Ok(Json(ReturnResponse {
        message: "Book returned successfully".to_string(),
        loan_id: id,
        return_date,
    }))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.services.loans.delete_loan(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Loan with id {} not found", id)))
    }
}
