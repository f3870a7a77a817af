//! 診察予約トリガー

use pawcare_domain::{appointment::Appointment, notification::Notification, status::AppointmentStatus};

use super::NotificationTriggers;

impl NotificationTriggers {
    pub(super) async fn on_appointment_created(&self, appointment: Appointment) {
        let Some(recipient) = appointment.contact_email().map(str::to_string) else {
            tracing::info!(
                appointment_id = %appointment.id,
                "patientEmail が無いため予約受付通知をスキップ"
            );
            return;
        };

        self.mailer
            .deliver(Notification::AppointmentBooked {
                recipient,
                appointment,
            })
            .await;
    }

    pub(super) async fn on_appointment_status_changed(&self, appointment: Appointment) {
        let Some(recipient) = appointment.contact_email().map(str::to_string) else {
            return;
        };

        if appointment.status() == Some(AppointmentStatus::Confirmed) {
            self.mailer
                .deliver(Notification::AppointmentConfirmed {
                    recipient: recipient.clone(),
                    appointment: appointment.clone(),
                })
                .await;
        }
        if appointment.status() == Some(AppointmentStatus::Completed) {
            self.mailer
                .deliver(Notification::AppointmentCompleted {
                    recipient,
                    appointment,
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use pawcare_domain::{
        collection::Collection,
        document::{Document, DocumentEvent, fields},
    };
    use pawcare_infra::{
        ChangeFeed,
        DocumentStore,
        mock::{InMemoryDocumentStore, MockNotificationSender},
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::usecase::trigger::test_support::{drain, make_triggers};

    #[tokio::test]
    async fn 患者アドレスが無ければ送らずガードも書かない() {
        let store = InMemoryDocumentStore::new();
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);
        let data = fields(json!({"petName": "Milo", "status": "pending"}));
        store.seed(Collection::Appointments, "a1", data.clone());

        triggers
            .handle(DocumentEvent::created(
                Collection::Appointments,
                &Document::new("a1", data.clone()),
            ))
            .await;

        assert!(sender.sent_emails().is_empty());
        assert_eq!(store.document(Collection::Appointments, "a1").unwrap().data, data);
    }

    #[tokio::test]
    async fn 作成時に予約受付メールを送る() {
        let store = InMemoryDocumentStore::new();
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);
        let data = fields(json!({"patientEmail": "p@example.com", "petName": "Milo"}));
        store.seed(Collection::Appointments, "a2", data.clone());

        triggers
            .handle(DocumentEvent::created(
                Collection::Appointments,
                &Document::new("a2", data),
            ))
            .await;

        let sent = sender.sent_to("p@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Appointment Booked");
        assert!(
            store
                .document(Collection::Appointments, "a2")
                .unwrap()
                .flag("appointmentCreatedEmailSent")
        );
    }

    #[tokio::test]
    async fn 確定と完了でそれぞれ一通ずつ送る() {
        let (feed, mut stream) = ChangeFeed::channel();
        let store = InMemoryDocumentStore::with_change_feed(feed);
        store.seed(
            Collection::Appointments,
            "a3",
            fields(json!({"patientEmail": "p@example.com", "status": "pending"})),
        );
        let sender = MockNotificationSender::new();
        let triggers = make_triggers(&store, &sender);

        for status in ["confirmed", "confirmed", "completed"] {
            store
                .update_fields(Collection::Appointments, "a3", fields(json!({"status": status})))
                .await
                .unwrap();
        }
        drain(&triggers, &mut stream).await;

        let subjects: Vec<String> = sender
            .sent_to("p@example.com")
            .into_iter()
            .map(|email| email.subject)
            .collect();
        assert_eq!(subjects, vec!["Appointment Confirmed", "Appointment Completed"]);
    }
}
