use serde::Deserialize;

use crate::models::od_form::OdForm;

#[derive(Debug, Deserialize)]
pub struct ExportFormsPayload {
    pub forms: Vec<OdForm>,
}
