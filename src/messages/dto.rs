use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::messages::repo_types::{ContactMessage, NewMessage};
use crate::validate::{require_filled, require_valid_email};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl SendMessageRequest {
    pub fn validate(&self) -> Result<(), HttpError> {
        require_filled(&[
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.message,
        ])?;
        require_valid_email(&self.email)
    }

    pub fn into_new_message(self) -> NewMessage {
        NewMessage {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            message: self.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<ContactMessage>,
}
