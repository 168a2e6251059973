//! Persons repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::person::{CreatePerson, Person, UpdatePerson},
};

use super::is_foreign_key_violation;

#[derive(Clone)]
pub struct PersonsRepository {
    pool: Pool<Postgres>,
}

impl PersonsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get person by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Person> {
        sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE person_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person with id {} not found", id)))
    }

    /// Get all persons
    pub async fn get_all(&self) -> AppResult<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>("SELECT * FROM persons ORDER BY person_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(persons)
    }

    /// Search persons by name or last name containing the term
    /// (case-insensitive, either field)
    pub async fn search(&self, term: &str) -> AppResult<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(
            r#"
            SELECT * FROM persons
            WHERE name ILIKE '%' || $1 || '%' OR last_name ILIKE '%' || $1 || '%'
            ORDER BY person_id
            "#,
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(persons)
    }

    /// Get person by exact name and last name
    pub async fn get_by_name(&self, name: &str, last_name: &str) -> AppResult<Person> {
        sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE name = $1 AND last_name = $2")
            .bind(name)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Person with name '{} {}' not found", name, last_name))
            })
    }

    /// Create a new person; the store assigns the identity
    pub async fn create(&self, person: &CreatePerson) -> AppResult<Person> {
        let created = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (name, last_name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&person.name)
        .bind(&person.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an existing person
    pub async fn update(&self, person: &UpdatePerson) -> AppResult<Person> {
        sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET name = $1, last_name = $2
            WHERE person_id = $3
            RETURNING *
            "#,
        )
        .bind(&person.name)
        .bind(&person.last_name)
        .bind(person.person_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Person with id {} not found", person.person_id)))
    }

    /// Delete a person. Returns false when no person with that id exists.
    /// Fails with Conflict when the person is still referenced by a loan.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM persons WHERE person_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(format!("Person {} is still referenced by a loan", id))
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
