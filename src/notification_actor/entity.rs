use std::fmt;
use std::time::Duration;

/// Delay before a new notification becomes visible.
pub const SHOW_DELAY: Duration = Duration::from_millis(100);
/// Time from insertion until the notification starts hiding.
pub const DISPLAY_DURATION: Duration = Duration::from_millis(3000);
/// Hide transition before removal.
pub const REMOVE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Entering,
    Shown,
    Leaving,
}

/// One transient message in the notification stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub phase: NotificationPhase,
}
