//! Person (borrower) management service

use crate::{
    error::AppResult,
    models::person::{CreatePerson, Person, UpdatePerson},
    repository::Repository,
};

#[derive(Clone)]
pub struct PersonsService {
    repository: Repository,
}

impl PersonsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Person>> {
        self.repository.persons.get_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Person> {
        self.repository.persons.get_by_id(id).await
    }

    /// Persons whose name or last name contains the term
    pub async fn search(&self, term: &str) -> AppResult<Vec<Person>> {
        self.repository.persons.search(term).await
    }

    /// Person with exactly the given name pair
    pub async fn get_by_name(&self, name: &str, last_name: &str) -> AppResult<Person> {
        self.repository.persons.get_by_name(name, last_name).await
    }

    pub async fn create_person(&self, person: CreatePerson) -> AppResult<Person> {
        let created = self.repository.persons.create(&person).await?;
        tracing::info!(
            "Person {} created: {} {}",
            created.person_id,
            created.name,
            created.last_name
        );
        Ok(created)
    }

    pub async fn update_person(&self, person: UpdatePerson) -> AppResult<Person> {
        self.repository.persons.update(&person).await
    }

    /// Delete a person; false when it does not exist, Conflict when a loan
    /// still references it
    pub async fn delete_person(&self, id: i32) -> AppResult<bool> {
        self.repository.persons.delete(id).await
    }
}
