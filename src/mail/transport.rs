use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// Trait for handing a composed message to a mail system
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<()>;
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SmtpTls {
    /// Upgrade with STARTTLS when the server offers it
    #[default]
    Opportunistic,
    /// Require STARTTLS
    Starttls,
    /// Implicit TLS from the first byte (usually port 465)
    Tls,
    /// Plain text
    None,
}

/// Connection settings for [`SmtpMailer`]
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: SmtpTls,
    pub timeout: Duration,
}

/// SMTP delivery through a pooled async connection
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let tls = match settings.tls {
            SmtpTls::None => Tls::None,
            mode => {
                let params = TlsParameters::new(settings.host.clone())
                    .context("failed to set up TLS parameters")?;
                match mode {
                    SmtpTls::Starttls => Tls::Required(params),
                    SmtpTls::Tls => Tls::Wrapper(params),
                    _ => Tls::Opportunistic(params),
                }
            }
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(tls)
            .timeout(Some(settings.timeout));

        if let Some(username) = &settings.username {
            let password = settings.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }

        Ok(Self {
            transport: builder.build(),
            host: format!("{}:{}", settings.host, settings.port),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<()> {
        let recipients = message.envelope().to().len();
        let response = self
            .transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery via {} failed", self.host))?;

        debug!(
            code = %response.code(),
            recipients,
            "SMTP server accepted message"
        );
        Ok(())
    }
}

/// Dry-run transport that keeps messages in memory instead of sending them.
///
/// Only the most recent `capacity` messages are retained; older ones are
/// dropped as new ones arrive.
#[derive(Debug, Clone)]
pub struct Outbox {
    sent: Arc<Mutex<VecDeque<Message>>>,
    capacity: usize,
}

impl Outbox {
    /// Messages retained by [`Outbox::new`]
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sent: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Retained messages, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for Outbox {
    async fn deliver(&self, message: Message) -> Result<()> {
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(
            ?recipients,
            bytes = message.formatted().len(),
            "dry run: message kept in outbox"
        );

        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        if self.capacity == 0 {
            return Ok(());
        }
        while sent.len() >= self.capacity {
            sent.pop_front();
        }
        sent.push_back(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::message::header::ContentType;

    fn message(to: &str) -> Message {
        Message::builder()
            .from("robot@example.com".parse().unwrap())
            .to(to.parse().unwrap())
            .subject("hi")
            .header(ContentType::TEXT_PLAIN)
            .body("hello".to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_outbox_keeps_messages() {
        let outbox = Outbox::new();
        outbox.deliver(message("a@example.com")).await.unwrap();
        outbox.deliver(message("b@example.com")).await.unwrap();

        let sent = outbox.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].envelope().to()[0].to_string(), "b@example.com");
    }

    #[tokio::test]
    async fn test_outbox_drops_oldest_beyond_capacity() {
        let outbox = Outbox::with_capacity(2);
        for to in ["a@example.com", "b@example.com", "c@example.com"] {
            outbox.deliver(message(to)).await.unwrap();
        }

        let recipients: Vec<String> = outbox
            .messages()
            .iter()
            .map(|m| m.envelope().to()[0].to_string())
            .collect();
        assert_eq!(recipients, ["b@example.com", "c@example.com"]);

        let discard = Outbox::with_capacity(0);
        discard.deliver(message("a@example.com")).await.unwrap();
        assert!(discard.messages().is_empty());
    }

    #[tokio::test]
    async fn test_smtp_mailer_builds_for_every_tls_mode() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        for tls in [SmtpTls::Opportunistic, SmtpTls::Starttls, SmtpTls::Tls, SmtpTls::None] {
            let settings = SmtpSettings {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: Some("robot".to_string()),
                password: Some("secret".to_string()),
                tls,
                timeout: Duration::from_secs(5),
            };
            assert!(SmtpMailer::new(&settings).is_ok());
        }
    }
}
