use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Stored and serialized as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Patient => "Patient",
            Role::Doctor => "Doctor",
            Role::Admin => "Admin",
        })
    }
}

/// Uploaded avatar, stored as a JSONB blob on the user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub public_id: String,
    pub url: String,
}

/// One account row. The password hash never serializes, and the optional
/// fields drop out of the JSON when absent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    pub gender: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_department: Option<String>,
    #[serde(rename = "docAvatar", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<sqlx::types::Json<Avatar>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload. By the time one of these exists the password is hashed
/// and the role is pinned by the handler, never by the client.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: Option<String>,
    pub dob: Option<String>,
    pub gender: String,
    pub password_hash: String,
    pub role: Role,
    pub doctor_department: Option<String>,
    pub avatar: Option<Avatar>,
}
