//! # 診察予約
//!
//! `appointments` コレクション。通知先は `patientEmail`。

use serde::Deserialize;

use crate::{
    document::Document,
    lenient::opt_string,
    status::{AppointmentStatus, parse_status},
};

/// 診察予約
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appointment {
    #[serde(skip)]
    pub id:            String,
    #[serde(deserialize_with = "opt_string")]
    pub status:        Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub patient_email: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub patient_name:  Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub pet_name:      Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub doctor_name:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub clinic_name:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub date:          Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub time:          Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub reason:        Option<String>,
}

impl Appointment {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            ..crate::record::decode_fields(document)
        }
    }

    /// 通知先メールアドレス
    pub fn contact_email(&self) -> Option<&str> {
        self.patient_email.as_deref()
    }

    pub fn status(&self) -> Option<AppointmentStatus> {
        self.status.as_deref().and_then(parse_status)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::fields;

    #[test]
    fn test_空白のみのpatient_emailは通知先なし() {
        let appointment = Appointment::from_document(&Document::new(
            "a1",
            fields(json!({"patientEmail": "  ", "status": "pending"})),
        ));

        assert_eq!(appointment.contact_email(), None);
        assert_eq!(appointment.status(), Some(AppointmentStatus::Pending));
    }
}
