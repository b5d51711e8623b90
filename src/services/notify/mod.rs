//! Delivery of check-in links and codes to guests.

pub mod log;
pub mod smtp;

use async_trait::async_trait;

#[async_trait]
pub trait CheckinNotifier: Send + Sync {
    async fn send_checkin_link(&self, notice: &CheckinNotice) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct RoomLine {
    pub number: String,
    pub room_type: String,
}

/// Everything a check-in invitation shows the guest.
#[derive(Debug, Clone)]
pub struct CheckinNotice {
    pub recipient: String,
    pub booking_ref: String,
    pub link: String,
    pub guest_name: String,
    pub rooms: Vec<RoomLine>,
    pub check_in_date: String,
    pub check_out_date: String,
    pub code: String,
}

impl CheckinNotice {
    pub fn subject(&self) -> String {
        format!("Booking confirmation and pre-check-in: {}", sanitize(&self.booking_ref))
    }

    pub fn text_body(&self, signature: &str) -> String {
        format!(
            "Dear {name},\n\n\
             Thank you for booking with us. Here are your booking details:\n\n\
             Booking reference: {reference}\n\
             Check-in code: {code}\n\
             Rooms:\n{rooms}\n\
             Check-in: {check_in}\n\
             Check-out: {check_out}\n\n\
             Complete your pre-check-in here: {link}\n\n\
             Best regards,\n{signature}",
            name = sanitize(&self.guest_name),
            reference = sanitize(&self.booking_ref),
            code = sanitize(&self.code),
            rooms = rooms_text(&self.rooms),
            check_in = sanitize(&self.check_in_date),
            check_out = sanitize(&self.check_out_date),
            link = with_scheme(&sanitize(&self.link)),
        )
    }

    pub fn html_body(&self, signature: &str) -> String {
        format!(
            r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Pre-check-in</title></head>
<body style="background:#f5f7fb; font-family:Arial, sans-serif; color:#222;">
  <div style="max-width:640px; margin:20px auto; background:#fff; padding:24px; border-radius:8px;">
    <h2>Booking confirmation and pre-check-in</h2>
    <p>Dear {name},</p>
    <p><strong>Booking reference:</strong> {reference}</p>
    <p><strong>Check-in code:</strong> {code}</p>
    <p><strong>Rooms:</strong> {rooms}</p>
    <p><strong>Check-in:</strong> {check_in}</p>
    <p><strong>Check-out:</strong> {check_out}</p>
    <p><a href="{link}" style="display:inline-block; padding:12px 20px; background:#0b74ff; color:#fff; text-decoration:none; border-radius:6px;">Complete pre-check-in</a></p>
    <p>Best regards,<br>{signature}</p>
  </div>
</body>
</html>"#,
            name = escape_html(&sanitize(&self.guest_name)),
            reference = escape_html(&sanitize(&self.booking_ref)),
            code = escape_html(&sanitize(&self.code)),
            rooms = rooms_html(&self.rooms),
            check_in = escape_html(&sanitize(&self.check_in_date)),
            check_out = escape_html(&sanitize(&self.check_out_date)),
            link = escape_html(&with_scheme(&sanitize(&self.link))),
            signature = escape_html(signature),
        )
    }
}

/// `{frontend}/checkin?token=...`, falling back to localhost when no frontend is configured.
pub fn build_checkin_link(frontend_url: &str, token: &str) -> String {
    let base = frontend_url.trim().trim_end_matches('/');
    let base = if base.is_empty() {
        "http://localhost:3000"
    } else {
        base
    };
    format!("{base}/checkin?token={token}")
}

/// `jane.doe@example.com` -> `j******e@e******.com`
pub fn mask_email(email: &str) -> String {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let chars: Vec<char> = local.chars().collect();
    let masked_local: String = match chars.len() {
        0 | 1 => local.to_string(),
        2 => format!("{}*", chars[0]),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    };

    let masked_domain = match domain.split_once('.') {
        Some((host, rest)) if host.chars().count() > 1 => {
            let mut host_chars = host.chars();
            let first = host_chars.next().unwrap_or('*');
            format!("{first}{}.{rest}", "*".repeat(host_chars.count()))
        }
        _ => domain.to_string(),
    };

    format!("{masked_local}@{masked_domain}")
}

fn sanitize(s: &str) -> String {
    s.trim().replace(['\r', '\n'], " ")
}

fn with_scheme(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link.trim_start_matches('/'))
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn room_label(room: &RoomLine) -> String {
    let number = sanitize(&room.number);
    let room_type = sanitize(&room.room_type);
    if room_type.is_empty() {
        number
    } else {
        format!("{number} ({room_type})")
    }
}

fn rooms_text(rooms: &[RoomLine]) -> String {
    if rooms.is_empty() {
        return " - N/A".to_string();
    }
    rooms
        .iter()
        .map(|r| format!(" - {}", room_label(r)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn rooms_html(rooms: &[RoomLine]) -> String {
    if rooms.is_empty() {
        return "<em>N/A</em>".to_string();
    }
    let items: String = rooms
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(&room_label(r))))
        .collect();
    format!("<ul>{items}</ul>")
}
