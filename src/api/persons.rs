//! Person (borrower) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::person::{CreatePerson, Person, PersonNameQuery, UpdatePerson},
};

use super::BasicAuth;

/// List all persons
#[utoipa::path(
    get,
    path = "/persons",
    tag = "persons",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "List of persons", body = Vec<Person>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_all_persons(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
) -> AppResult<Json<Vec<Person>>> {
    let persons = state.services.persons.get_all().await?;
    Ok(Json(persons))
}

/// Get person by ID
#[utoipa::path(
    get,
    path = "/persons/{id}",
    tag = "persons",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person details", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<Json<Person>> {
    let person = state.services.persons.get_by_id(id).await?;
    Ok(Json(person))
}

/// Search persons by name or last name containing the term
#[utoipa::path(
    get,
    path = "/persons/search/{term}",
    tag = "persons",
    security(("basic_auth" = [])),
    params(
        ("term" = String, Path, description = "Search term")
    ),
    responses(
        (status = 200, description = "Matching persons", body = Vec<Person>)
    )
)]
pub async fn search_persons(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(term): Path<String>,
) -> AppResult<Json<Vec<Person>>> {
    let persons = state.services.persons.search(&term).await?;
    Ok(Json(persons))
}

/// Get person by exact name and last name
#[utoipa::path(
    get,
    path = "/persons/byname",
    tag = "persons",
    security(("basic_auth" = [])),
    params(PersonNameQuery),
    responses(
        (status = 200, description = "Person details", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person_by_name(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Query(query): Query<PersonNameQuery>,
) -> AppResult<Json<Person>> {
    let person = state
        .services
        .persons
        .get_by_name(&query.name, &query.last_name)
        .await?;
    Ok(Json(person))
}

/// Create a new person
#[utoipa::path(
    post,
    path = "/persons",
    tag = "persons",
    security(("basic_auth" = [])),
    request_body = CreatePerson,
    responses(
        (status = 201, description = "Person created", body = Person),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Json(person): Json<CreatePerson>,
) -> AppResult<(StatusCode, Json<Person>)> {
    person
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.persons.create_person(person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing person. The path id must match the body id.
#[utoipa::path(
    put,
    path = "/persons/{id}",
    tag = "persons",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    request_body = UpdatePerson,
    responses(
        (status = 200, description = "Person updated", body = Person),
        (status = 400, description = "ID mismatch or invalid input"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn update_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
    Json(person): Json<UpdatePerson>,
) -> AppResult<Json<Person>> {
    if id != person.person_id {
        return Err(AppError::Validation("ID mismatch".to_string()));
    }
    person
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.persons.update_person(person).await?;
    Ok(Json(updated))
}

/// Delete a person
#[utoipa::path(
    delete,
    path = "/persons/{id}",
    tag = "persons",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Person still referenced by a loan")
    )
)]
pub async fn delete_person(
    State(state): State<crate::AppState>,
    BasicAuth(_user): BasicAuth,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.services.persons.delete_person(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Person with id {} not found", id)))
    }
}
