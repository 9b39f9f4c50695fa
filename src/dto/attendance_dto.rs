use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::attendance::{SheetHandle, Student};
use crate::models::event::Event;
use crate::services::sheets_client::PermissionRole;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSheetPayload {
    #[validate(nested)]
    pub event: Event,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInPayload {
    #[validate(nested)]
    pub student: Student,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckOutPayload {
    #[validate(length(min = 1))]
    pub prn: String,
}

fn validate_emails(emails: &[String]) -> Result<(), ValidationError> {
    use validator::ValidateEmail;
    if emails.iter().all(|e| e.validate_email()) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SharePayload {
    #[validate(length(min = 1), custom(function = "validate_emails"))]
    pub emails: Vec<String>,
    #[serde(default)]
    pub role: PermissionRole,
}

#[derive(Debug, Serialize)]
pub struct SheetCreatedResponse {
    #[serde(flatten)]
    pub handle: SheetHandle,
    pub success: bool,
}
