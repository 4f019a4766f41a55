use std::time::Duration;
use std::time::Instant;

use ratatui::style::Color;

/// How long notifications and transient statuses stay on screen.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn colour(&self) -> Color {
        match self {
            NotificationKind::Info => return Color::Rgb(99, 102, 241),
            NotificationKind::Success => return Color::Rgb(16, 185, 129),
            NotificationKind::Warning => return Color::Rgb(245, 158, 11),
            NotificationKind::Error => return Color::Rgb(239, 68, 68),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: &str) -> Notification {
        return Notification {
            kind,
            message: message.to_string(),
            expires_at: Instant::now() + NOTIFICATION_LIFETIME,
        };
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        return now >= self.expires_at;
    }
}
