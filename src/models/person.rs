//! Person (borrower) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Person model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub person_id: i32,
    pub name: String,
    pub last_name: String,
}

/// Create person request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePerson {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: String,
}

/// Update person request, carrying the id that must match the path
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePerson {
    pub person_id: i32,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: String,
}

/// Exact name lookup query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct PersonNameQuery {
    pub name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_last_name_is_rejected() {
        let person = CreatePerson {
            name: "John".to_string(),
            last_name: String::new(),
        };
        assert!(person.validate().is_err());
    }

    #[test]
    fn valid_person_passes() {
        let person = CreatePerson {
            name: "John".to_string(),
            last_name: "Smith".to_string(),
        };
        assert!(person.validate().is_ok());
    }
}
