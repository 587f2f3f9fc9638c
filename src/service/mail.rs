use std::sync::Arc;

use lettre::message::Mailbox;
use tracing::info;

use crate::error::ServiceError;
use crate::io::TempStorage;
use crate::mail::{self, Address, Email, MailAttachment, MailTransport};
use crate::media;
use crate::models::UploadedFile;

pub const MAIL_SUBJECT: &str = "Your requested file";
pub const MAIL_BODY: &str = "Please find the attached file.";

/// Sends uploaded files as email attachments.
#[derive(Clone)]
pub struct MailService {
    storage: TempStorage,
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
}

impl MailService {
    pub fn new(storage: TempStorage, transport: Arc<dyn MailTransport>, from: Mailbox) -> Self {
        Self {
            storage,
            transport,
            from,
        }
    }

    /// Mail `upload` to every address in the comma-separated `recipients`.
    ///
    /// Returns the number of distinct recipients.
    pub async fn send_file(
        &self,
        upload: &UploadedFile,
        recipients: &str,
    ) -> Result<usize, ServiceError> {
        let to = parse_recipients(recipients)?;
        let count = to.len();

        let staged = self.storage.stage(upload).await?;
        let content = staged.read().await?;

        let email = Email {
            to,
            subject: MAIL_SUBJECT.to_string(),
            body: MAIL_BODY.to_string(),
            attachment: Some(MailAttachment {
                file_name: staged.file_name().to_string(),
                content_type: media::essence(staged.content_type()),
                content,
            }),
        };
        let message = mail::compose(&self.from, email)?;

        self.transport
            .deliver(message)
            .await
            .map_err(|e| ServiceError::Delivery(format!("{:#}", e)))?;

        info!(
            attachment = staged.file_name(),
            recipients = count,
            "sent file by email"
        );
        Ok(count)
    }
}

/// Split a comma-separated recipient list, dropping blanks and duplicates.
pub fn parse_recipients(raw: &str) -> Result<Vec<Address>, ServiceError> {
    let mut addresses: Vec<Address> = Vec::new();

    for candidate in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let address: Address = candidate
            .parse()
            .map_err(|_| ServiceError::InvalidRecipient(candidate.to_string()))?;
        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }

    if addresses.is_empty() {
        return Err(ServiceError::NoRecipients);
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::Outbox;

    #[test]
    fn test_parse_recipients() {
        let parsed = parse_recipients(" a@example.com, ,b@example.org,a@example.com ").unwrap();
        let parsed: Vec<String> = parsed.iter().map(ToString::to_string).collect();
        assert_eq!(parsed, ["a@example.com", "b@example.org"]);
    }

    #[test]
    fn test_parse_recipients_errors() {
        assert!(matches!(parse_recipients(""), Err(ServiceError::NoRecipients)));
        assert!(matches!(parse_recipients(" , "), Err(ServiceError::NoRecipients)));
        assert!(matches!(
            parse_recipients("a@example.com,not-an-address"),
            Err(ServiceError::InvalidRecipient(bad)) if bad == "not-an-address"
        ));
    }

    #[tokio::test]
    async fn test_send_file_delivers_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::new();
        let service = MailService::new(
            TempStorage::new(dir.path()),
            Arc::new(outbox.clone()),
            "robot@example.com".parse().unwrap(),
        );

        let upload = UploadedFile::new("cv.pdf", "application/pdf", &b"%PDF-1.7"[..]);
        let sent = service
            .send_file(&upload, "a@example.com,b@example.com")
            .await
            .unwrap();
        assert_eq!(sent, 2);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

        let messages = outbox.messages();
        assert_eq!(messages.len(), 1);
        let raw = String::from_utf8(messages[0].formatted()).unwrap();
        assert!(raw.contains("Subject: Your requested file"));
        assert!(raw.contains("filename=\"cv.pdf\""));
    }

    #[tokio::test]
    async fn test_invalid_recipient_stages_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::new();
        let service = MailService::new(
            TempStorage::new(dir.path().join("never-created")),
            Arc::new(outbox.clone()),
            "robot@example.com".parse().unwrap(),
        );

        let upload = UploadedFile::new("cv.pdf", "application/pdf", &b"%PDF-1.7"[..]);
        let err = service.send_file(&upload, "nobody").await.unwrap_err();

        assert!(err.is_client_error());
        assert!(!dir.path().join("never-created").exists());
        assert!(outbox.messages().is_empty());
    }
}
