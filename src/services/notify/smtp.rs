use anyhow::Context;
use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{CheckinNotice, CheckinNotifier};

/// Sends check-in invitations over SMTP as multipart plain text + HTML.
pub struct SmtpNotifier {
    host: String,
    port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpNotifier {
    pub fn new(
        host: String,
        port: u16,
        username: String,
        password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        // Relays commonly reject senders other than the authenticated account.
        let from_email = if from_email.is_empty() {
            username.clone()
        } else {
            from_email
        };
        Self {
            host,
            port,
            credentials: Credentials::new(username, password),
            from_email,
            from_name,
        }
    }

    fn transport(&self) -> anyhow::Result<SmtpTransport> {
        Ok(SmtpTransport::starttls_relay(&self.host)
            .with_context(|| format!("invalid SMTP relay {}", self.host))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn build_message(&self, notice: &CheckinNotice) -> anyhow::Result<Message> {
        let from = format!("{} <{}>", self.from_name, self.from_email);
        Message::builder()
            .from(from.parse().context("invalid from address")?)
            .to(notice
                .recipient
                .parse()
                .context("invalid recipient address")?)
            .subject(notice.subject())
            .multipart(MultiPart::alternative_plain_html(
                notice.text_body(&self.from_name),
                notice.html_body(&self.from_name),
            ))
            .context("failed to build check-in email")
    }
}

#[async_trait]
impl CheckinNotifier for SmtpNotifier {
    async fn send_checkin_link(&self, notice: &CheckinNotice) -> anyhow::Result<()> {
        let message = self.build_message(notice)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .context("email task failed")?
            .context("SMTP send failed")?;

        tracing::info!(booking_ref = %notice.booking_ref, "check-in email sent");
        Ok(())
    }
}
