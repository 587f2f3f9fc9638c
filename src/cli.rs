use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lettre::message::Mailbox;

use crate::mail::{SmtpSettings, SmtpTls};

/// 32 MiB
const DEFAULT_UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "zipmail")]
#[command(version)]
#[command(about = "HTTP service that inspects and builds ZIP archives and mails documents", long_about = None)]
#[command(after_help = "Every option can also be set through the environment variable shown,\n\
  or through a .env file in the working directory.")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory for temporary upload files [default: <system temp>/zipmail]
    #[arg(long, env = "TMPDIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_UPLOAD_LIMIT)]
    pub max_upload_bytes: usize,

    /// SMTP server host name
    #[arg(long, env = "SMTP_HOST", required_unless_present = "mail_dry_run")]
    pub smtp_host: Option<String>,

    /// SMTP server port
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP user name
    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    /// How the SMTP connection is secured
    #[arg(long, env = "SMTP_TLS", value_enum, default_value_t = SmtpTls::Opportunistic)]
    pub smtp_tls: SmtpTls,

    /// SMTP connection timeout in seconds
    #[arg(long, env = "SMTP_TIMEOUT_SECS", default_value_t = 30)]
    pub smtp_timeout_secs: u64,

    /// Sender address [default: SMTP user]
    #[arg(long, env = "MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Log messages instead of sending them
    #[arg(long, env = "MAIL_DRY_RUN")]
    pub mail_dry_run: bool,
}

impl Cli {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("zipmail"))
    }

    /// Sender mailbox: `MAIL_FROM`, else the SMTP user.
    pub fn sender(&self) -> Result<Mailbox> {
        let from = self
            .mail_from
            .as_deref()
            .or(self.smtp_user.as_deref())
            .ok_or_else(|| anyhow!("no sender address: set MAIL_FROM or SMTP_USER"))?;
        from.parse()
            .with_context(|| format!("invalid sender address '{}'", from))
    }

    /// SMTP settings, `None` in dry-run mode.
    pub fn smtp_settings(&self) -> Result<Option<SmtpSettings>> {
        if self.mail_dry_run {
            return Ok(None);
        }

        let host = self
            .smtp_host
            .clone()
            .ok_or_else(|| anyhow!("SMTP_HOST is not set"))?;

        Ok(Some(SmtpSettings {
            host,
            port: self.smtp_port,
            username: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
            tls: self.smtp_tls,
            timeout: Duration::from_secs(self.smtp_timeout_secs),
        }))
    }
}
