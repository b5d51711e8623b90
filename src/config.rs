use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub frontend_url: String,
    pub checkin_token_ttl_hours: i64,
    pub checkin_code_ttl_days: i64,
    pub checkin_code_never_expire: bool,
    pub checkin_resend_extension_minutes: i64,
    pub session_sweep_interval_secs: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    pub smtp_from_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "frontdesk.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            checkin_token_ttl_hours: parse_var("CHECKIN_TOKEN_TTL_HOURS", 24),
            checkin_code_ttl_days: parse_var("CHECKIN_CODE_TTL_DAYS", 7),
            checkin_code_never_expire: env::var("CHECKIN_CODE_NEVER_EXPIRE")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            checkin_resend_extension_minutes: parse_var("CHECKIN_RESEND_EXTENSION_MINUTES", 15),
            session_sweep_interval_secs: parse_var("SESSION_SWEEP_INTERVAL_SECS", 300),
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: parse_var("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from_email: env::var("SMTP_FROM_EMAIL").unwrap_or_default(),
            smtp_from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Front Desk".to_string()),
        }
    }

    pub fn smtp_configured(&self) -> bool {
        !self.smtp_host.is_empty()
            && !self.smtp_username.is_empty()
            && !self.smtp_password.is_empty()
    }

    pub fn checkin_settings(&self) -> CheckinSettings {
        CheckinSettings {
            token_ttl: chrono::Duration::hours(self.checkin_token_ttl_hours),
            code_ttl: if self.checkin_code_never_expire {
                None
            } else {
                Some(chrono::Duration::days(self.checkin_code_ttl_days))
            },
            resend_extension: chrono::Duration::minutes(self.checkin_resend_extension_minutes),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

/// Lifetimes and link settings for check-in sessions.
#[derive(Clone, Debug)]
pub struct CheckinSettings {
    pub token_ttl: chrono::Duration,
    /// `None` disables code expiry.
    pub code_ttl: Option<chrono::Duration>,
    pub resend_extension: chrono::Duration,
    pub frontend_url: String,
}

impl Default for CheckinSettings {
    fn default() -> Self {
        Self {
            token_ttl: chrono::Duration::hours(24),
            code_ttl: Some(chrono::Duration::days(7)),
            resend_extension: chrono::Duration::minutes(15),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
