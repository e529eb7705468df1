use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of an appointment request. New rows start out Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A visit request. Identity fields are snapshotted from the form rather
/// than joined from the patient row, so later profile edits do not rewrite
/// appointment history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub dob: String,
    pub gender: String,
    pub appointment_date: String,
    pub department: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub has_visited: bool,
    pub address: String,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub status: AppointmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub dob: String,
    pub gender: String,
    pub appointment_date: String,
    pub department: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub has_visited: bool,
    pub address: String,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}
