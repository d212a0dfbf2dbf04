use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::EmailSender;

const OTP_TEMPLATE: &str = include_str!("../../templates/otp-email.html");

/// OTP email body with the code substituted into the template.
pub fn render_otp_email(otp: i32) -> String {
    OTP_TEMPLATE.replace("{{OTP}}", &otp.to_string())
}

fn sent(to: &str) -> String {
    format!("HTML mail sent successfully to {to}")
}

// ── HTTP API sender ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends mail through a JSON HTTP mail API authenticated with a bearer key.
#[derive(Clone)]
pub struct HttpEmailSender {
    pub client: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl HttpEmailSender {
    async fn post(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await
            .context("send mail request")?
            .error_for_status()
            .context("mail api rejected message")?;
        Ok(())
    }
}

impl EmailSender for HttpEmailSender {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> String {
        match self.post(to, subject, html).await {
            Ok(()) => {
                tracing::info!(%to, %subject, "mail sent");
                sent(to)
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), %to, "mail delivery failed");
                format!("Failed to send email: {e}")
            }
        }
    }
}

// ── Log-only sender ──────────────────────────────────────────────────────────

/// Development sender: writes the message to the log instead of delivering it.
#[derive(Clone, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> String {
        tracing::info!(%to, %subject, body_len = html.len(), "mail delivery disabled, message logged");
        tracing::debug!(%to, body = %html, "mail body");
        sent(to)
    }
}

/// Sender chosen at startup from configuration.
#[derive(Clone)]
pub enum Mailer {
    Http(HttpEmailSender),
    Log(LogEmailSender),
}

impl EmailSender for Mailer {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> String {
        match self {
            Self::Http(sender) => sender.send_html(to, subject, html).await,
            Self::Log(sender) => sender.send_html(to, subject, html).await,
        }
    }
}
