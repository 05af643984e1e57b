//! Records consumed from the backend API.
//!
//! Only the fields the UI displays are modelled; anything else the backend
//! sends is ignored.

use serde::{Deserialize, Serialize};

pub type EntityId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUniversity {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: EntityId,
    pub university_id: EntityId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFaculty {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: EntityId,
    pub faculty_id: EntityId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A professor or a student: both are a named person with an email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub type Professor = Person;
pub type Student = Person;

/// Absolute URL of an asset path returned by the backend (e.g. `logo_url`).
///
/// The path is appended verbatim to the backend base URL.
pub fn resolve_asset_url(backend_url: &str, path: &str) -> String {
    format!("{backend_url}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn university_ignores_unknown_fields() {
        let uni: University = serde_json::from_str(
            r#"{"id":1,"name":"Uni","code":"U1","created_at":"2024-01-01","logo_url":"/storage/u1.png"}"#,
        )
        .unwrap();
        assert_eq!(uni.logo_url.as_deref(), Some("/storage/u1.png"));
        assert_eq!(uni.description, None);
    }

    #[test]
    fn asset_url_is_concatenated() {
        assert_eq!(
            resolve_asset_url("http://localhost:8000", "/storage/logo.png"),
            "http://localhost:8000/storage/logo.png"
        );
    }
}
