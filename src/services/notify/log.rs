use async_trait::async_trait;

use super::{CheckinNotice, CheckinNotifier};

/// Development notifier used when SMTP is not configured: logs the invitation instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl CheckinNotifier for LogNotifier {
    async fn send_checkin_link(&self, notice: &CheckinNotice) -> anyhow::Result<()> {
        let rooms: Vec<String> = notice
            .rooms
            .iter()
            .map(|r| format!("{} {}", r.number, r.room_type).trim().to_string())
            .collect();

        tracing::info!(
            to = %notice.recipient,
            booking_ref = %notice.booking_ref,
            code = %notice.code,
            link = %notice.link,
            rooms = %rooms.join(", "),
            "check-in email (not sent, SMTP not configured)"
        );
        Ok(())
    }
}
