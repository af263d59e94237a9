//! Outgoing mail. Messages are sent from spawned tasks so a slow or broken
//! mail server never holds up the request that triggered them.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{MailConfig, MailTransport};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("file transport: {0}")]
    File(#[from] lettre::transport::file::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Welcome,
    VerificationDecision,
    AccountStatus,
    StaffLinked,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub recipient: String,
    pub name: String,
    pub subject: String,
    pub message: String,
    /// Extra markup placed under the message
    pub html: Option<String>,
    pub kind: NotificationKind,
}

enum Transport {
    Log,
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

pub struct Notifier {
    transport: Transport,
    from_address: String,
    from_name: String,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transport = match self.transport {
            Transport::Log => "log",
            Transport::Smtp(_) => "smtp",
            Transport::File(_) => "file",
        };
        f.debug_struct("Notifier")
            .field("transport", &transport)
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl Notifier {
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = match config.transport {
            MailTransport::Log => Transport::Log,
            MailTransport::Smtp => {
                let host = config
                    .smtp_host
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("mail.smtp_host is required for the smtp transport"))?;
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?.port(config.smtp_port);
                if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
                    builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
                } else {
                    warn!("SMTP transport configured without credentials");
                }
                Transport::Smtp(builder.build())
            }
            MailTransport::File => {
                let dir = Path::new(&config.file_dir);
                std::fs::create_dir_all(dir)?;
                Transport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }

    /// Queues `notification` on the runtime and returns immediately.
    pub fn dispatch(self: &Arc<Self>, notification: Notification) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&notification).await {
                error!(
                    recipient = %notification.recipient,
                    kind = ?notification.kind,
                    "Failed to send notification: {}",
                    e
                );
            }
        });
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let from: Mailbox = format!("{} <{}>", self.from_name, self.from_address).parse()?;
        let to: Mailbox = format!("{} <{}>", notification.name, notification.recipient).parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(render_body(notification))?;

        match &self.transport {
            Transport::Log => {
                info!(
                    recipient = %notification.recipient,
                    kind = ?notification.kind,
                    subject = %notification.subject,
                    "Mail transport disabled, notification logged only"
                );
            }
            Transport::Smtp(smtp) => {
                smtp.send(message).await?;
            }
            Transport::File(file) => {
                file.send(message).await?;
            }
        }

        debug!(recipient = %notification.recipient, kind = ?notification.kind, "Notification delivered");
        Ok(())
    }
}

fn render_body(notification: &Notification) -> String {
    format!(
        "<p>Hello {},</p>\n<p>{}</p>\n{}<p>The Unihaven team</p>",
        notification.name,
        notification.message,
        notification.html.as_deref().unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_includes_optional_fragment() {
        let mut notification = Notification {
            recipient: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            subject: "Welcome".to_string(),
            message: "Your account is ready.".to_string(),
            html: None,
            kind: NotificationKind::Welcome,
        };
        let plain = render_body(&notification);
        assert!(plain.contains("Hello Jane,"));
        assert!(plain.contains("Your account is ready."));

        notification.html = Some("<a href=\"/rooms\">Browse rooms</a>".to_string());
        assert!(render_body(&notification).contains("Browse rooms"));
    }

    #[tokio::test]
    async fn test_file_transport_writes_message() {
        let dir = std::env::temp_dir().join(format!("unihaven-mail-{}", uuid::Uuid::new_v4()));
        let config = MailConfig {
            transport: MailTransport::File,
            from_address: "no-reply@unihaven.local".to_string(),
            from_name: "Unihaven".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            file_dir: dir.to_string_lossy().into_owned(),
        };
        let notifier = Notifier::from_config(&config).unwrap();

        notifier
            .send(&Notification {
                recipient: "jane@example.com".to_string(),
                name: "Jane".to_string(),
                subject: "Identity verified".to_string(),
                message: "You are now an Owner.".to_string(),
                html: None,
                kind: NotificationKind::VerificationDecision,
            })
            .await
            .unwrap();

        let written = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(written, 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
