//! Email composition and delivery.
//!
//! [`compose`] turns an [`Email`] into a MIME `multipart/mixed` message: a
//! UTF-8 text part followed by an optional base64 attachment. Delivery goes
//! through a [`MailTransport`], either real SMTP or the in-memory [`Outbox`].

mod transport;

pub use transport::{MailTransport, Outbox, SmtpMailer, SmtpSettings, SmtpTls};

use anyhow::{Result, anyhow, bail};
use lettre::Message;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};

pub use lettre::Address;

/// A file attached to an outgoing email.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// An outgoing email before MIME encoding.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: Vec<Address>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

/// Build the MIME message for `email`, sent from `from`.
///
/// Every recipient is listed in the `To` header.
pub fn compose(from: &Mailbox, email: Email) -> Result<Message> {
    if email.to.is_empty() {
        bail!("recipient list cannot be empty");
    }

    let mut builder = Message::builder()
        .from(from.clone())
        .subject(email.subject);
    for address in email.to {
        builder = builder.to(Mailbox::new(None, address));
    }

    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.body));
    if let Some(attachment) = email.attachment {
        let content_type = ContentType::parse(&attachment.content_type)
            .or_else(|_| ContentType::parse("application/octet-stream"))
            .map_err(|e| anyhow!("invalid attachment content type: {}", e))?;
        let content = Body::new_with_encoding(attachment.content, ContentTransferEncoding::Base64)
            .map_err(|_| anyhow!("failed to encode attachment"))?;
        body = body.singlepart(Attachment::new(attachment.file_name).body(content, content_type));
    }

    builder
        .multipart(body)
        .map_err(|e| anyhow!("failed to build message: {}", e))
}
