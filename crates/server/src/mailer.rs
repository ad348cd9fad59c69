//! Outbound delivery of one-time passwords.

use async_trait::async_trait;
use homerent_core::config::MailConfig;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, recipient: &str, code: &str) -> Result<(), MailError>;
}

/// Records each delivery as a structured log event instead of talking to SMTP.
#[derive(Clone, Debug)]
pub struct LoggingMailer {
    sender: String,
    enabled: bool,
}

impl LoggingMailer {
    pub fn from_config(config: &MailConfig) -> Self {
        Self { sender: config.sender.clone(), enabled: config.enabled }
    }
}

#[async_trait]
impl OtpMailer for LoggingMailer {
    async fn send_otp(&self, recipient: &str, code: &str) -> Result<(), MailError> {
        if self.enabled {
            info!(
                event_name = "mail.otp.sent",
                correlation_id = %recipient,
                sender = %self.sender,
                subject = "Password Reset OTP",
                "otp delivered"
            );
        } else {
            // Local runs have no mailbox, so the code goes to the log.
            info!(
                event_name = "mail.otp.logged",
                correlation_id = %recipient,
                otp = %code,
                "mail disabled; otp written to log"
            );
        }
        Ok(())
    }
}
