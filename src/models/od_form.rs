use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdForm {
    pub form_reference: String,
    pub student_name: String,
    pub prn: String,
    pub event_name: String,
    pub event_type: String,
    pub start_date: String,
    pub end_date: String,
    pub venue: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}
