use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: i64,
    pub booking_id: i64,
    pub full_name: String,
    pub is_main_guest: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub current_address: String,
    pub id_type: String,
    pub id_number: String,
    pub id_issued_country: String,
    pub face_image_path: String,
    pub document_image_path: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

/// Guest details as entered by the guest when finalizing check-in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGuest {
    pub full_name: String,
    pub is_main_guest: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub current_address: String,
    pub id_type: String,
    pub id_number: String,
    pub id_issued_country: String,
    pub face_image_path: String,
    pub document_image_path: String,
    pub email: String,
}
