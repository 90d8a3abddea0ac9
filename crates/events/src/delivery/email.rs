//! Alert delivery via SMTP.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport to send one
//! plain-text message per alert. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns
//! `Ok(None)` and no mailer should be constructed.
//!
//! Every delivery runs a complete session: the transport is built and its
//! connection verified, the message composed and sent, and the transport
//! dropped at the end of the call whether or not the send succeeded.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use motorwatch_core::AlertEvent;

use super::{Notifier, NotifyError};

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "alerts@motorwatch.local";

/// Configuration for the SMTP alert channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Alert recipient.
    pub to_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured. Returns an error naming the variable if
    /// SMTP is configured but `ALERT_EMAIL_TO` is missing.
    ///
    /// | Variable         | Required        | Default                 |
    /// |------------------|-----------------|-------------------------|
    /// | `SMTP_HOST`      | yes             | -                       |
    /// | `SMTP_PORT`      | no              | `587`                   |
    /// | `SMTP_FROM`      | no              | `alerts@motorwatch.local` |
    /// | `SMTP_USER`      | no              | -                       |
    /// | `SMTP_PASSWORD`  | no              | -                       |
    /// | `ALERT_EMAIL_TO` | with SMTP_HOST  | -                       |
    pub fn from_env() -> Result<Option<Self>, NotifyError> {
        let Ok(smtp_host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };
        let to_address = std::env::var("ALERT_EMAIL_TO").map_err(|_| {
            NotifyError::Address("ALERT_EMAIL_TO must be set when SMTP_HOST is set".to_string())
        })?;

        Ok(Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            to_address,
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Message composition
// ---------------------------------------------------------------------------

/// Subject line for an alert, e.g. `[motorwatch] motor_temp_01 above 25.00 C`.
pub fn alert_subject(alert: &AlertEvent) -> String {
    format!(
        "[motorwatch] {} above {:.2} {}",
        alert.sensor_name(),
        alert.threshold(),
        alert.unit()
    )
}

/// Plain-text body embedding sensor, value, threshold and timestamp.
pub fn alert_body(alert: &AlertEvent) -> String {
    format!(
        "Sensor: {}\nMeasured: {:.2} {}\nThreshold: {:.2} {}\nTime: {}",
        alert.sensor_name(),
        alert.value(),
        alert.unit(),
        alert.threshold(),
        alert.unit(),
        alert.raised_at().to_rfc3339(),
    )
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Sends alert emails via SMTP.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    /// Create a new notifier with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn open_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| NotifyError::Connect(e.to_string()))?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(transport_builder.build())
    }

    fn compose(&self, alert: &AlertEvent) -> Result<Message, NotifyError> {
        let from = self
            .config
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(e.to_string()))?;
        let to = self
            .config
            .to_address
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(alert_subject(alert))
            .header(ContentType::TEXT_PLAIN)
            .body(alert_body(alert))
            .map_err(|e| NotifyError::Compose(e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn deliver_alert(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        let mailer = self.open_transport()?;

        match mailer.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(NotifyError::Connect(format!(
                    "SMTP relay {}:{} refused the session",
                    self.config.smtp_host, self.config.smtp_port
                )))
            }
            Err(e) => return Err(NotifyError::Connect(e.to_string())),
        }

        let email = self.compose(alert)?;
        mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        tracing::info!(
            to = %self.config.to_address,
            sensor = %alert.sensor_name(),
            "Alert email sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
