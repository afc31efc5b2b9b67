use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

/// Surface for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log; used when no UI is attached.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Default => {
                log::info!("🔔 {}: {}", notification.title, notification.description)
            }
            NotificationVariant::Destructive => {
                log::warn!("⚠️ {}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::info("Analysis complete!", "Recognized: Apple"));
        notifier.notify(Notification::error("Analysis error", "Unrecognized food"));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(!sent[0].is_error());
        assert!(sent[1].is_error());
        assert_eq!(sent[1].description, "Unrecognized food");
    }

    #[test]
    fn test_log_notifier_accepts_both_variants() {
        let notifier: &dyn Notifier = &LogNotifier;
        notifier.notify(Notification::info("Added to diary!", "Apple added to the meal plan"));
        notifier.notify(Notification::error("Error", "Please select an image"));
    }
}
