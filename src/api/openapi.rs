//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, persons};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "0.1.0",
        description = "Library Loan Management REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::get_all_books,
        books::get_book,
        books::get_books_by_author,
        books::get_book_by_name,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Persons
        persons::get_all_persons,
        persons::get_person,
        persons::search_persons,
        persons::get_person_by_name,
        persons::create_person,
        persons::update_person,
        persons::delete_person,
        // Loans
        loans::get_all_loans,
        loans::get_loan,
        loans::get_active_loans_by_person,
        loans::get_loan_history_by_person,
        loans::get_active_loans_by_book,
        loans::is_book_available,
        loans::get_overdue_loans,
        loans::get_returned_loans,
        loans::is_loan_returned,
        loans::create_loan,
        loans::update_loan,
        loans::return_loan,
        loans::delete_loan,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Persons
            crate::models::person::Person,
            crate::models::person::CreatePerson,
            crate::models::person::UpdatePerson,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::UpdateLoan,
            crate::models::loan::ReturnLoan,
            loans::AvailabilityResponse,
            loans::ReturnedStatusResponse,
            loans::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "persons", description = "Borrower management"),
        (name = "loans", description = "Loan lifecycle and queries")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
