use std::time::Duration;

use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use time::macros::format_description;
use time::Date;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::reservation::Reservation;

/// Outbound mail channel state, fixed once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// Credentials supplied and verified, notifications will be sent.
    Ready,
    /// No credentials supplied, notifications are skipped.
    Disabled,
    /// Credentials supplied but verification failed.
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub restaurant_sent: bool,
    pub guest_sent: bool,
}

impl NotifyOutcome {
    pub fn skipped() -> Self {
        Self { restaurant_sent: false, guest_sent: false }
    }

    pub fn all_sent(&self) -> bool {
        self.restaurant_sent && self.guest_sent
    }
}

/// Sends the two reservation notifications over SMTP. Missing credentials
/// disable the channel instead of failing startup.
pub struct Mailer {
    state: ChannelState,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: String,
    restaurant_email: String,
    restaurant_phone: String,
}

impl Mailer {
    pub async fn from_config(config: &Config) -> Self {
        let (user, pass) = match (config.email_user.as_deref(), config.email_pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                (user.to_string(), pass.to_string())
            }
            _ => {
                info!("Email credentials not supplied, reservation notifications are disabled");
                return Self::with_state(ChannelState::Disabled, None, config);
            }
        };

        // A hung relay must not stall a submission, so sends are bounded.
        let transport = match AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_relay) {
            Ok(builder) => builder
                .credentials(Credentials::new(user.clone(), pass))
                .timeout(Some(Duration::from_secs(30)))
                .build(),
            Err(e) => {
                warn!("Failed to set up SMTP relay {} due to: {}", config.smtp_relay, e);
                return Self::with_state(ChannelState::Unavailable, None, config);
            }
        };

        match transport.test_connection().await {
            Ok(true) => {
                info!("SMTP channel verified, notifications will be sent from {}", user);
                Self::with_state(ChannelState::Ready, Some(transport), config)
            }
            Ok(false) => {
                warn!("SMTP relay {} rejected the connection test, notifications are unavailable", config.smtp_relay);
                Self::with_state(ChannelState::Unavailable, None, config)
            }
            Err(e) => {
                warn!("SMTP channel verification failed due to: {}", e);
                Self::with_state(ChannelState::Unavailable, None, config)
            }
        }
    }

    fn with_state(
        state: ChannelState,
        transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
        config: &Config,
    ) -> Self {
        let sender = config.email_user.clone().unwrap_or_default();
        Self {
            state,
            transport,
            restaurant_email: config.restaurant_email.clone().unwrap_or_else(|| sender.clone()),
            restaurant_phone: config.restaurant_phone.clone(),
            sender,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ChannelState::Ready
    }

    /// Sends the restaurant summary and the guest acknowledgement for one
    /// reservation. The two sends are sequential and independent: a failed
    /// restaurant send never stops the guest send. When the channel is not
    /// ready both sends are skipped without error.
    pub async fn notify_both(&self, reservation: &Reservation) -> NotifyOutcome {
        let transport = match (&self.state, &self.transport) {
            (ChannelState::Ready, Some(transport)) => transport,
            _ => return NotifyOutcome::skipped(),
        };

        let restaurant_sent = self
            .send(transport, self.restaurant_message(reservation), reservation.id)
            .await;
        let guest_sent = self
            .send(transport, self.guest_message(reservation), reservation.id)
            .await;

        NotifyOutcome { restaurant_sent, guest_sent }
    }

    async fn send(
        &self,
        transport: &AsyncSmtpTransport<Tokio1Executor>,
        message: anyhow::Result<Message>,
        reservation_id: i64,
    ) -> bool {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build notification for reservation {} due to: {}", reservation_id, e);
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to send notification for reservation {} due to: {}", reservation_id, e);
                false
            }
        }
    }

    fn restaurant_message(&self, reservation: &Reservation) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.sender_mailbox()?)
            .to(self
                .restaurant_email
                .parse::<Mailbox>()
                .context("Invalid restaurant email address")?)
            .subject(format!("New reservation request from {}", reservation.name))
            .header(ContentType::TEXT_HTML)
            .body(restaurant_body(reservation))
            .context("Failed to build restaurant notification")
    }

    fn guest_message(&self, reservation: &Reservation) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.sender_mailbox()?)
            .to(reservation.email.parse::<Mailbox>().with_context(|| {
                format!("Invalid guest email address: {}", reservation.email)
            })?)
            .subject("Your reservation request")
            .header(ContentType::TEXT_HTML)
            .body(guest_body(reservation, &self.restaurant_phone))
            .context("Failed to build guest notification")
    }

    fn sender_mailbox(&self) -> anyhow::Result<Mailbox> {
        self.sender
            .parse::<Mailbox>()
            .context("Invalid sender email address")
    }
}

/// Full summary for the restaurant inbox. User-supplied text is escaped
/// before it lands in the HTML body.
fn restaurant_body(reservation: &Reservation) -> String {
    let notes = if reservation.notes.is_empty() {
        String::new()
    } else {
        format!("<p><strong>Notes:</strong> {}</p>", escape_html(&reservation.notes))
    };

    format!(
        "<h2>New Reservation Request</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Date:</strong> {}</p>\
         <p><strong>Time:</strong> {}</p>\
         <p><strong>Guests:</strong> {}</p>\
         {}",
        escape_html(&reservation.name),
        escape_html(&reservation.phone),
        escape_html(&reservation.email),
        escape_html(&format_long_date(&reservation.date)),
        escape_html(&reservation.time),
        reservation.guests,
        notes,
    )
}

/// Reduced acknowledgement for the guest: date, time and party size only.
fn guest_body(reservation: &Reservation, restaurant_phone: &str) -> String {
    format!(
        "<h2>Thank you for your reservation request!</h2>\
         <p>We received your request for a table for {} on {} at {}.</p>\
         <p>We will contact you shortly to confirm your booking. If you have any \
         questions, please call us at {}.</p>",
        reservation.guests,
        escape_html(&format_long_date(&reservation.date)),
        escape_html(&reservation.time),
        escape_html(restaurant_phone),
    )
}

/// Renders `2026-09-12` as `Saturday, September 12, 2026`. Input that does
/// not parse as a calendar date is passed through unchanged.
pub fn format_long_date(date: &str) -> String {
    let input = format_description!("[year]-[month]-[day]");
    let output = format_description!("[weekday repr:long], [month repr:long] [day padding:none], [year]");

    match Date::parse(date, &input) {
        Ok(parsed) => parsed.format(&output).unwrap_or_else(|_| date.to_string()),
        Err(_) => date.to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            environment: "test".to_string(),
            port: 3000,
            origin_urls: "http://localhost:3000".to_string(),
            email_user: None,
            email_pass: None,
            smtp_relay: "smtp.gmail.com".to_string(),
            restaurant_email: None,
            restaurant_phone: "(555) 284-7316".to_string(),
            reservations_dir: "reservations".to_string(),
        }
    }

    fn sample_reservation(notes: &str) -> Reservation {
        Reservation::new(
            "Grace Hopper".to_string(),
            "+1 555 0101".to_string(),
            "grace@example.com".to_string(),
            "2026-09-12".to_string(),
            "20:00".to_string(),
            2,
            notes.to_string(),
        )
    }

    #[tokio::test]
    async fn missing_credentials_disable_the_channel() {
        let mailer = Mailer::from_config(&test_config()).await;
        assert_eq!(mailer.state(), ChannelState::Disabled);
        assert!(!mailer.is_ready());
    }

    #[tokio::test]
    async fn notify_both_is_skipped_when_disabled() {
        let mailer = Mailer::from_config(&test_config()).await;
        let outcome = mailer.notify_both(&sample_reservation("")).await;
        assert_eq!(outcome, NotifyOutcome::skipped());
        assert!(!outcome.all_sent());
    }

    #[test]
    fn outcome_is_all_sent_only_when_both_succeed() {
        assert!(NotifyOutcome { restaurant_sent: true, guest_sent: true }.all_sent());
        assert!(!NotifyOutcome { restaurant_sent: true, guest_sent: false }.all_sent());
        assert!(!NotifyOutcome { restaurant_sent: false, guest_sent: true }.all_sent());
    }

    #[test]
    fn long_date_uses_full_weekday_and_month() {
        assert_eq!(format_long_date("2026-09-12"), "Saturday, September 12, 2026");
        assert_eq!(format_long_date("2026-01-05"), "Monday, January 5, 2026");
    }

    #[test]
    fn unparseable_date_is_passed_through() {
        assert_eq!(format_long_date("next friday"), "next friday");
        assert_eq!(format_long_date(""), "");
    }

    #[test]
    fn user_text_is_escaped_in_the_restaurant_body() {
        let mut reservation = sample_reservation("bring <script>alert(1)</script>");
        reservation.name = "Bobby \"Tables\"".to_string();

        let body = restaurant_body(&reservation);
        assert!(body.contains("Bobby &quot;Tables&quot;"));
        assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn notes_appear_only_when_present() {
        let with_notes = restaurant_body(&sample_reservation("no peanuts"));
        assert!(with_notes.contains("Notes:"));
        assert!(with_notes.contains("no peanuts"));

        let without_notes = restaurant_body(&sample_reservation(""));
        assert!(!without_notes.contains("Notes:"));
    }

    #[test]
    fn guest_body_carries_the_reduced_detail_set() {
        let reservation = sample_reservation("window seat");
        let body = guest_body(&reservation, "(555) 284-7316");

        assert!(body.contains("Saturday, September 12, 2026"));
        assert!(body.contains("20:00"));
        assert!(body.contains("table for 2"));
        assert!(body.contains("(555) 284-7316"));
        // Guests never see their own contact details or notes echoed back.
        assert!(!body.contains("grace@example.com"));
        assert!(!body.contains("window seat"));
    }
}
