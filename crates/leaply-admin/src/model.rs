//! Entity types exchanged with the Leaply API.
//!
//! Entities carry server-assigned identity and timestamps; payloads are what
//! the client sends on create/update and never include either. Every optional
//! field is an `Option`, so an unset value stays unset across a
//! load, edit, save cycle instead of collapsing to `0` or `""`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The three entity kinds the admin panel manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    University,
    Program,
    User,
}

impl EntityKind {
    /// Collection path on the API (`/universities`, ...).
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::University => "universities",
            Self::Program => "programs",
            Self::User => "users",
        }
    }

    /// Path of a single record.
    pub fn item_path(self, id: Uuid) -> String {
        format!("{}/{id}", self.collection_path())
    }

    /// Human label, singular.
    pub fn label(self) -> &'static str {
        match self {
            Self::University => "University",
            Self::Program => "Program",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection_path())
    }
}

/// Implemented by every server-owned record.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub name_local: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub ranking_qs: Option<i32>,
    #[serde(default)]
    pub ranking_times: Option<i32>,
    #[serde(default)]
    pub ranking_national: Option<i32>,
    /// Public, Private, ...
    #[serde(default, rename = "type")]
    pub university_type: Option<String>,
    #[serde(default)]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Entity for University {
    const KIND: EntityKind = EntityKind::University;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub university_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub degree_type: Option<String>,
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub major_categories: Option<Vec<String>>,
    #[serde(default)]
    pub duration_months: Option<i32>,
    #[serde(default)]
    pub delivery_mode: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub scholarship_available: bool,
    #[serde(default)]
    pub scholarship_notes: Option<String>,
    #[serde(default)]
    pub application_fee_usd: Option<f64>,
    #[serde(default)]
    pub admissions_url: Option<String>,
    #[serde(default)]
    pub program_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Owning university, when the server expands it.
    #[serde(default)]
    pub university: Option<University>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Entity for Program {
    const KIND: EntityKind = EntityKind::Program;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Create/update body for `/universities`.
///
/// Unset fields serialize as `null` so a PUT clears them on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversityPayload {
    pub name: String,
    pub name_local: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub ranking_qs: Option<i32>,
    pub ranking_times: Option<i32>,
    pub ranking_national: Option<i32>,
    #[serde(rename = "type")]
    pub university_type: Option<String>,
    pub primary_language: Option<String>,
    pub description: Option<String>,
}

/// Create/update body for `/programs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramPayload {
    pub university_id: Uuid,
    pub name: String,
    pub degree_type: Option<String>,
    pub degree_name: Option<String>,
    pub major_categories: Option<Vec<String>>,
    pub duration_months: Option<i32>,
    pub delivery_mode: Option<String>,
    pub language: Option<String>,
    pub scholarship_available: bool,
    pub scholarship_notes: Option<String>,
    pub application_fee_usd: Option<f64>,
    pub admissions_url: Option<String>,
    pub program_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn university_json() -> serde_json::Value {
        json!({
            "id": "7f1c1c2e-2b1a-4f7e-9d43-0a8f3c1b2d11",
            "name": "Test U",
            "ranking_qs": 0,
            "type": "Public",
            "created_at": "2025-01-10T08:00:00Z",
            "updated_at": "2025-01-10T08:00:00Z"
        })
    }

    #[test]
    fn test_absent_ranking_is_distinct_from_zero() {
        let uni: University = serde_json::from_value(university_json()).unwrap();
        assert_eq!(uni.ranking_qs, Some(0));
        assert_eq!(uni.ranking_times, None);
        assert_eq!(uni.university_type.as_deref(), Some("Public"));
    }

    #[test]
    fn test_payload_serializes_unset_as_null() {
        let payload = UniversityPayload {
            name: "Test U".into(),
            ranking_national: Some(0),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["name"], "Test U");
        assert_eq!(value["ranking_qs"], serde_json::Value::Null);
        assert_eq!(value["ranking_national"], 0);
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_program_embeds_university() {
        let program: Program = serde_json::from_value(json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "university_id": "7f1c1c2e-2b1a-4f7e-9d43-0a8f3c1b2d11",
            "name": "MSc Robotics",
            "university": university_json(),
            "created_at": "2025-01-10T08:00:00Z",
            "updated_at": "2025-01-10T08:00:00Z"
        }))
        .unwrap();
        assert!(!program.scholarship_available);
        assert_eq!(program.university.unwrap().name, "Test U");
        assert_eq!(program.major_categories, None);
    }

    #[test]
    fn test_entity_kind_paths() {
        let id = Uuid::nil();
        assert_eq!(EntityKind::Program.collection_path(), "programs");
        assert_eq!(
            EntityKind::User.item_path(id),
            "users/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(EntityKind::University.to_string(), "universities");
    }
}
