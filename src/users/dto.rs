use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::users::repo_types::{Avatar, NewUser, Role, User};
use crate::validate::{none_if_empty, require_filled, require_valid_email};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
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
    pub password: String,
}

impl RegisterPatientRequest {
    /// National id and date of birth are the only optional fields on this
    /// form.
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.gender,
            &self.password,
        ])?;
        require_valid_email(&self.email)
    }

    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            national_id: none_if_empty(self.national_id),
            dob: none_if_empty(self.dob),
            gender: self.gender,
            password_hash,
            role: Role::Patient,
            doctor_department: None,
            avatar: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[&self.email, &self.password, &self.confirm_password])?;
        if self.password != self.confirm_password {
            return Err(HttpError::Validation(
                "Password & Confirm Password Do Not Match!".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAdminRequest {
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
    pub password: String,
}

impl AddAdminRequest {
    /// Unlike patient self-registration, every identity field is required
    /// here.
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.national_id,
            &self.dob,
            &self.gender,
            &self.password,
        ])?;
        require_valid_email(&self.email)
    }

    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            national_id: Some(self.national_id),
            dob: Some(self.dob),
            gender: self.gender,
            password_hash,
            role: Role::Admin,
            doctor_department: None,
            avatar: None,
        }
    }
}

/// Collected from `multipart/form-data` text fields. The avatar file is
/// handled separately by the handler.
#[derive(Debug, Default)]
pub struct AddDoctorForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub dob: String,
    pub gender: String,
    pub password: String,
    pub doctor_department: String,
}

impl AddDoctorForm {
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.national_id,
            &self.dob,
            &self.gender,
            &self.password,
            &self.doctor_department,
        ])?;
        require_valid_email(&self.email)
    }

    pub fn into_new_user(self, password_hash: String, avatar: Avatar) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            national_id: Some(self.national_id),
            dob: Some(self.dob),
            gender: self.gender,
            password_hash,
            role: Role::Doctor,
            doctor_department: Some(self.doctor_department),
            avatar: Some(avatar),
        }
    }
}

/// Body returned whenever a session is granted, i.e. on register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct DoctorsResponse {
    pub success: bool,
    pub doctors: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct AdminCreatedResponse {
    pub success: bool,
    pub message: String,
    pub admin: User,
}

#[derive(Debug, Serialize)]
pub struct DoctorCreatedResponse {
    pub success: bool,
    pub message: String,
    pub doctor: User,
}

/// Record-less `{ success, message }` reply, used by logout.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}
