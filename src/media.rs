//! MIME type policy.
//!
//! Uploads are judged by the `Content-Type` the client declared for each
//! multipart part. The bytes are never sniffed.

/// Word document (`.docx`)
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF: &str = "application/pdf";
pub const XML: &str = "application/xml";
pub const JPEG: &str = "image/jpeg";
pub const PNG: &str = "image/png";

/// Types that may be bundled into a new archive
pub const ARCHIVE_MEMBER_TYPES: &[&str] = &[DOCX, PDF, XML, JPEG, PNG];

/// Types that may be sent as a mail attachment
pub const MAIL_ATTACHMENT_TYPES: &[&str] = &[DOCX, PDF];

/// Strip parameters and normalize case: `Image/PNG; q=1` becomes `image/png`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a declared content type is in `allowed`.
pub fn is_allowed(content_type: &str, allowed: &[&str]) -> bool {
    let essence = essence(content_type);
    allowed.iter().any(|t| *t == essence)
}

/// MIME type for an archive entry name, empty when the extension is unknown.
pub fn guess_from_name(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .map(str::to_string)
        .unwrap_or_default()
}

/// Whether a client file name looks like a zip archive.
pub fn has_zip_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".zip")
}
