//! Outcome notifications produced by the submission client.
//!
//! A notification is a plain value. Anything that reacts to the user acting on
//! it (a click in a UI, a prompt in a terminal) asks [`Notification::activate`]
//! for the deferred action instead of registering a callback.

use std::time::Duration;

pub const SUCCESS_MESSAGE: &str = "Post created successfully 🎉 click to go.";
pub const FAILURE_MESSAGE: &str = "Something went wrong 😔";
pub const AUTO_CLOSE: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// Action deferred until the user activates a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Navigate { route: String },
}

impl PendingAction {
    pub fn navigate_to_post(slug: &str) -> Self {
        PendingAction::Navigate {
            route: format!("/{slug}"),
        }
    }

    pub fn route(&self) -> &str {
        match self {
            PendingAction::Navigate { route } => route,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub auto_close: Duration,
    action: Option<PendingAction>,
}

impl Notification {
    pub fn post_created(slug: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: SUCCESS_MESSAGE.to_string(),
            auto_close: AUTO_CLOSE,
            action: Some(PendingAction::navigate_to_post(slug)),
        }
    }

    /// Generic failure notice; never carries the underlying error detail.
    pub fn submission_failed() -> Self {
        Self {
            kind: NotificationKind::Error,
            message: FAILURE_MESSAGE.to_string(),
            auto_close: AUTO_CLOSE,
            action: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }

    /// The action to run when the user activates this notification, if any.
    pub fn activate(&self) -> Option<&PendingAction> {
        self.action.as_ref()
    }
}
