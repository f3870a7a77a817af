//! 処方箋トリガー
//!
//! 処方箋は連絡先を持たないため、親の診察予約から患者のアドレスを解決する。

use pawcare_domain::{
    appointment::Appointment,
    collection::Collection,
    notification::Notification,
    prescription::Prescription,
};

use super::NotificationTriggers;

impl NotificationTriggers {
    pub(super) async fn on_prescription_created(&self, prescription: Prescription) {
        let Some(appointment_id) = prescription
            .appointment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            return;
        };

        let appointment = match self.store.get(Collection::Appointments, appointment_id).await {
            Ok(Some(document)) => Appointment::from_document(&document),
            Ok(None) => return,
            Err(e) => {
                tracing::error!(
                    prescription_id = %prescription.id,
                    appointment_id = %appointment_id,
                    "診察予約の取得に失敗: {}",
                    e
                );
                return;
            }
        };
        let Some(recipient) = appointment.contact_email().map(str::to_string) else {
            return;
        };

        self.mailer
            .deliver(Notification::PrescriptionAvailable {
                recipient,
                prescription,
                appointment,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use pawcare_domain::document::{Document, DocumentEvent, fields};
    use pawcare_infra::mock::{InMemoryDocumentStore, MockNotificationSender};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::usecase::trigger::test_support::make_triggers;

    fn created(id: &str, data: serde_json::Value, store: &InMemoryDocumentStore) -> DocumentEvent {
        let data = fields(data);
        store.seed(Collection::DoctorPrescriptions, id, data.clone());
        DocumentEvent::created(Collection::DoctorPrescriptions, &Document::new(id, data))
    }

    #[tokio::test]
    async fn 親の診察予約の患者へ送る() {
        let store = InMemoryDocumentStore::new();
        store.seed(
            Collection::Appointments,
            "a1",
            fields(json!({"patientEmail": "p@example.com", "petName": "Milo"})),
        );
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);

        triggers
            .handle(created(
                "rx-1",
                json!({"appointmentId": "a1", "diagnosis": "Otitis"}),
                &store,
            ))
            .await;

        let sent = sender.sent_to("p@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your Prescription is Ready");
        assert!(
            store
                .document(Collection::DoctorPrescriptions, "rx-1")
                .unwrap()
                .flag("notificationSent")
        );
    }

    #[tokio::test]
    async fn 親の診察予約が無ければ何もしない() {
        let store = InMemoryDocumentStore::new();
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);

        triggers
            .handle(created("rx-2", json!({"appointmentId": "missing"}), &store))
            .await;

        assert!(sender.sent_emails().is_empty());
        assert!(
            !store
                .document(Collection::DoctorPrescriptions, "rx-2")
                .unwrap()
                .flag("notificationSent")
        );
    }

    #[tokio::test]
    async fn 親の診察予約にアドレスが無ければ何もしない() {
        let store = InMemoryDocumentStore::new();
        store.seed(Collection::Appointments, "a2", fields(json!({"petName": "Milo"})));
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);

        triggers
            .handle(created("rx-3", json!({"appointmentId": "a2"}), &store))
            .await;

        assert!(sender.sent_emails().is_empty());
    }
}
