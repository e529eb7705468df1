use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointments::repo_types::{Appointment, AppointmentStatus, NewAppointment};
use crate::error::HttpError;
use crate::validate::{require_filled, require_valid_email};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAppointmentRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub doctor_first_name: String,
    #[serde(default)]
    pub doctor_last_name: String,
    #[serde(default)]
    pub has_visited: bool,
    #[serde(default)]
    pub address: String,
}

impl PostAppointmentRequest {
    /// Everything except the has-visited flag is required on this form,
    /// national id and date of birth included.
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.national_id,
            &self.dob,
            &self.gender,
            &self.appointment_date,
            &self.department,
            &self.doctor_first_name,
            &self.doctor_last_name,
            &self.address,
        ])?;
        require_valid_email(&self.email)
    }

    pub fn into_new_appointment(self, doctor_id: Uuid, patient_id: Uuid) -> NewAppointment {
        NewAppointment {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            national_id: self.national_id,
            dob: self.dob,
            gender: self.gender,
            appointment_date: self.appointment_date,
            department: self.department,
            doctor_first_name: self.doctor_first_name,
            doctor_last_name: self.doctor_last_name,
            has_visited: self.has_visited,
            address: self.address,
            doctor_id,
            patient_id,
        }
    }
}

/// A status value outside the known set fails deserialization, so the
/// handler never sees a malformed status.
#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub success: bool,
    pub appointment: Appointment,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}
