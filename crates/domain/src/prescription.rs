//! # 処方箋
//!
//! `doctorPrescriptions` コレクション。自身は通知先を持たず、
//! `appointmentId` で参照する診察予約の `patientEmail` に送る。

use serde::Deserialize;

use crate::{document::Document, lenient::opt_string};

/// 処方箋
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prescription {
    #[serde(skip)]
    pub id:             String,
    #[serde(deserialize_with = "opt_string")]
    pub appointment_id: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub doctor_name:    Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub diagnosis:      Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub medications:    Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub notes:          Option<String>,
}

impl Prescription {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            ..crate::record::decode_fields(document)
        }
    }
}
