//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **欠損値はここで埋める**: テンプレートに渡す前に `N/A` / `Not provided` に置き換えるため、
//!   必須項目の欠けたレコードでもレンダリングは失敗しない
//! - **エスケープ**: HTML テンプレートは `/` を残すエスケープ関数で自動エスケープする
//!   （`N/A` や URL をそのまま読めるようにする）
//! - **レビューリンク**: `{base_url}/review/{bookingId}?type={kind}` をテンプレートに渡す
//! - **カスタムテンプレート**: `/sendTemplateEmail` 用に `templateId` で選ぶテンプレートを別途登録する

use pawcare_domain::{
    appointment::Appointment,
    booking::Booking,
    collection::BookingKind,
    money::{format_rupees, format_rupees_or_na},
    notification::{EmailMessage, Notification, NotificationError, OrderStatusNotice},
    order::{Order, OrderLine},
};
use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

const NOT_AVAILABLE: &str = "N/A";
const NOT_PROVIDED: &str = "Not provided";

/// `/sendTemplateEmail` で指定できるテンプレート ID
pub const CUSTOM_TEMPLATE_IDS: &[&str] = &["welcome", "promotion", "booking_reminder"];

/// テンプレートに渡す注文明細
#[derive(Debug, Serialize)]
struct LineView {
    name:       String,
    image:      Option<String>,
    price:      String,
    quantity:   String,
    line_total: String,
}

impl From<&OrderLine> for LineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name:       or_na(line.name.as_deref()),
            image:      line.image.clone().filter(|s| !s.trim().is_empty()),
            price:      format_rupees_or_na(line.price),
            quantity:   line
                .quantity
                .map_or_else(|| NOT_AVAILABLE.to_string(), |q| q.to_string()),
            line_total: format_rupees_or_na(line.line_total()),
        }
    }
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、[`Notification`] から [`EmailMessage`] を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();
        engine.set_escape_fn(escape_html);

        engine
            .add_raw_templates(vec![
                (
                    "order_placed.html",
                    include_str!("../../../templates/notifications/order_placed.html"),
                ),
                (
                    "order_placed.txt",
                    include_str!("../../../templates/notifications/order_placed.txt"),
                ),
                (
                    "new_order_alert.html",
                    include_str!("../../../templates/notifications/new_order_alert.html"),
                ),
                (
                    "new_order_alert.txt",
                    include_str!("../../../templates/notifications/new_order_alert.txt"),
                ),
                (
                    "order_status.html",
                    include_str!("../../../templates/notifications/order_status.html"),
                ),
                (
                    "order_status.txt",
                    include_str!("../../../templates/notifications/order_status.txt"),
                ),
                (
                    "appointment.html",
                    include_str!("../../../templates/notifications/appointment.html"),
                ),
                (
                    "appointment.txt",
                    include_str!("../../../templates/notifications/appointment.txt"),
                ),
                (
                    "prescription_available.html",
                    include_str!("../../../templates/notifications/prescription_available.html"),
                ),
                (
                    "prescription_available.txt",
                    include_str!("../../../templates/notifications/prescription_available.txt"),
                ),
                (
                    "booking_status.html",
                    include_str!("../../../templates/notifications/booking_status.html"),
                ),
                (
                    "booking_status.txt",
                    include_str!("../../../templates/notifications/booking_status.txt"),
                ),
                (
                    "booking_rating_reminder.html",
                    include_str!("../../../templates/notifications/booking_rating_reminder.html"),
                ),
                (
                    "booking_rating_reminder.txt",
                    include_str!("../../../templates/notifications/booking_rating_reminder.txt"),
                ),
                (
                    "custom/welcome.html",
                    include_str!("../../../templates/custom/welcome.html"),
                ),
                (
                    "custom/promotion.html",
                    include_str!("../../../templates/custom/promotion.html"),
                ),
                (
                    "custom/booking_reminder.html",
                    include_str!("../../../templates/custom/booking_reminder.html"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 通知イベントからメールメッセージを生成する
    ///
    /// # 引数
    ///
    /// - `notification`: 通知イベント
    /// - `base_url`: メール内リンクのベース URL（例: `https://pawcare.example.com`）
    pub fn render(
        &self,
        notification: &Notification,
        base_url: &str,
    ) -> Result<EmailMessage, NotificationError> {
        let (template_name, subject, context) = build_template_params(notification, base_url);

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to: notification.recipient_email().to_string(),
            cc: Vec::new(),
            subject,
            html_body,
            text_body: Some(text_body),
        })
    }

    /// カスタムテンプレートが登録されているか
    pub fn has_custom_template(&self, template_id: &str) -> bool {
        CUSTOM_TEMPLATE_IDS.contains(&template_id)
    }

    /// カスタムテンプレートを動的データでレンダリングする
    ///
    /// `data` がオブジェクトでない場合は空のコンテキストで描画する。
    pub fn render_custom(&self, template_id: &str, data: &Value) -> Result<String, NotificationError> {
        if !self.has_custom_template(template_id) {
            return Err(NotificationError::TemplateFailed(format!(
                "未知のテンプレート: {template_id}"
            )));
        }
        let context = match data {
            Value::Object(_) => Context::from_value(data.clone())
                .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?,
            _ => Context::new(),
        };
        self.engine
            .render(&format!("custom/{template_id}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))
    }
}

/// テンプレート名、件名、コンテキストを構築する
fn build_template_params(
    notification: &Notification,
    base_url: &str,
) -> (&'static str, String, Context) {
    let mut context = Context::new();

    match notification {
        Notification::OrderPlaced { order, lines, .. } => {
            insert_order(&mut context, order);
            insert_lines(&mut context, lines);
            (
                "order_placed",
                format!("Order Placed - #{}", order_ref(order)),
                context,
            )
        }
        Notification::NewOrderAlert { order, lines, .. } => {
            insert_order(&mut context, order);
            insert_lines(&mut context, lines);
            (
                "new_order_alert",
                format!("New Order Received - #{}", order_ref(order)),
                context,
            )
        }
        Notification::OrderStatusChanged { notice, order, .. } => {
            insert_order(&mut context, order);
            let (label, message) = match notice {
                OrderStatusNotice::Confirmed => (
                    "Confirmed",
                    "Your order has been confirmed and is being prepared.",
                ),
                OrderStatusNotice::Dispatched => ("Dispatched", "Your order is on its way."),
                OrderStatusNotice::Delivered => ("Delivered", "Your order has been delivered."),
                OrderStatusNotice::Cancelled => ("Cancelled", "Your order has been cancelled."),
            };
            context.insert("status_label", label);
            context.insert("status_message", message);
            context.insert("is_dispatched", &(*notice == OrderStatusNotice::Dispatched));
            let courier = order.courier_details.clone().unwrap_or_default();
            context.insert("courier_company", &or_na(courier.company.as_deref()));
            context.insert(
                "tracking_number",
                &or_na(courier.tracking_number.as_deref()),
            );
            (
                "order_status",
                format!("Order {label} - #{}", order_ref(order)),
                context,
            )
        }
        Notification::AppointmentBooked { appointment, .. } => {
            insert_appointment(&mut context, appointment);
            context.insert("headline", "Your appointment has been booked.");
            ("appointment", "Appointment Booked".to_string(), context)
        }
        Notification::AppointmentConfirmed { appointment, .. } => {
            insert_appointment(&mut context, appointment);
            context.insert("headline", "Your appointment has been confirmed.");
            ("appointment", "Appointment Confirmed".to_string(), context)
        }
        Notification::AppointmentCompleted { appointment, .. } => {
            insert_appointment(&mut context, appointment);
            context.insert(
                "headline",
                "Your appointment is complete. Thank you for visiting.",
            );
            ("appointment", "Appointment Completed".to_string(), context)
        }
        Notification::PrescriptionAvailable {
            prescription,
            appointment,
            ..
        } => {
            insert_appointment(&mut context, appointment);
            context.insert(
                "doctor_name",
                &or_na(
                    prescription
                        .doctor_name
                        .as_deref()
                        .or(appointment.doctor_name.as_deref()),
                ),
            );
            context.insert("diagnosis", &or_na(prescription.diagnosis.as_deref()));
            context.insert(
                "medications",
                &or_not_provided(prescription.medications.as_deref()),
            );
            context.insert("notes", &or_not_provided(prescription.notes.as_deref()));
            (
                "prescription_available",
                "Your Prescription is Ready".to_string(),
                context,
            )
        }
        Notification::BookingConfirmed { booking, .. } => {
            insert_booking(&mut context, booking);
            context.insert("status_label", "Confirmed");
            context.insert("show_review_link", &false);
            (
                "booking_status",
                format!("{} Booking Confirmed", booking.kind.label()),
                context,
            )
        }
        Notification::BookingCompleted { booking, .. } => {
            insert_booking(&mut context, booking);
            context.insert("status_label", "Completed");
            context.insert("show_review_link", &true);
            context.insert(
                "review_url",
                &review_url(base_url, &booking.id, booking.kind),
            );
            (
                "booking_status",
                format!("{} Booking Completed", booking.kind.label()),
                context,
            )
        }
        Notification::BookingCancelled { booking, .. } => {
            insert_booking(&mut context, booking);
            context.insert("status_label", "Cancelled");
            context.insert("show_review_link", &false);
            (
                "booking_status",
                format!("{} Booking Cancelled", booking.kind.label()),
                context,
            )
        }
        Notification::BookingRatingReminder { scheduled, .. } => {
            context.insert("user_name", &or_na(scheduled.user_name.as_deref()));
            context.insert("center_name", &or_na(scheduled.center_name.as_deref()));
            context.insert("kind_label", scheduled.booking_type.label());
            context.insert(
                "review_url",
                &review_url(base_url, &scheduled.booking_id, scheduled.booking_type),
            );
            (
                "booking_rating_reminder",
                format!("How was your {} experience?", scheduled.booking_type),
                context,
            )
        }
    }
}

fn review_url(base_url: &str, booking_id: &str, kind: BookingKind) -> String {
    format!(
        "{}/review/{booking_id}?type={kind}",
        base_url.trim_end_matches('/')
    )
}

fn order_ref(order: &Order) -> String {
    let short = order.short_ref();
    if short.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        short
    }
}

fn insert_order(context: &mut Context, order: &Order) {
    context.insert("order_ref", &order_ref(order));
    context.insert("order_id", &or_na(Some(order.id.as_str())));
    context.insert("customer_name", &or_na(order.customer_name()));
    context.insert("customer_email", &or_not_provided(order.contact_email()));
    context.insert(
        "customer_phone",
        &or_not_provided(order.customer_phone.as_deref()),
    );
    context.insert(
        "shipping_address",
        &or_not_provided(order.shipping_address.as_deref()),
    );
    context.insert("payment_method", &or_na(order.payment_method.as_deref()));
    context.insert("order_date", &or_na(order.created_at.as_deref()));
    context.insert("total", &format_rupees_or_na(order.amount()));
}

fn insert_lines(context: &mut Context, lines: &[OrderLine]) {
    let views: Vec<LineView> = lines.iter().map(LineView::from).collect();
    let items_total: f64 = lines.iter().filter_map(OrderLine::line_total).sum();
    context.insert("lines", &views);
    context.insert("items_total", &format_rupees(items_total));
}

fn insert_appointment(context: &mut Context, appointment: &Appointment) {
    context.insert("patient_name", &or_na(appointment.patient_name.as_deref()));
    context.insert("pet_name", &or_na(appointment.pet_name.as_deref()));
    context.insert("doctor_name", &or_na(appointment.doctor_name.as_deref()));
    context.insert("clinic_name", &or_na(appointment.clinic_name.as_deref()));
    context.insert("date", &or_na(appointment.date.as_deref()));
    context.insert("time", &or_na(appointment.time.as_deref()));
    context.insert("reason", &or_not_provided(appointment.reason.as_deref()));
}

fn insert_booking(context: &mut Context, booking: &Booking) {
    context.insert("kind_label", booking.kind.label());
    context.insert("booking_id", &or_na(Some(booking.id.as_str())));
    context.insert("user_name", &or_na(booking.user_name.as_deref()));
    context.insert("center_name", &or_na(booking.center_name.as_deref()));
    context.insert("pet_name", &or_na(booking.pet_name.as_deref()));
    context.insert("pet_type", &or_na(booking.pet_type.as_deref()));
    context.insert("pet_breed", &or_na(booking.pet_breed.as_deref()));
    context.insert("service", &or_na(booking.service.as_deref()));
    context.insert("check_in", &or_na(booking.check_in()));
    context.insert("check_out", &or_na(booking.check_out()));
    context.insert("total_cost", &format_rupees_or_na(booking.total_cost));
}

/// HTML の特殊文字をエスケープする
///
/// tera 既定のエスケープと異なり `/` は変換しない。
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn or_na(value: Option<&str>) -> String {
    placeholder(value, NOT_AVAILABLE)
}

fn or_not_provided(value: Option<&str>) -> String {
    placeholder(value, NOT_PROVIDED)
}

fn placeholder(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
