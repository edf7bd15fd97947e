//! Notices: the status line shown to the user after each action.

use serde::Serialize;

use crate::session::{ErrorKind, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }

    pub fn connecting() -> Self {
        Self::new(NoticeLevel::Info, "Waiting for wallet authorization...")
    }

    pub fn connected() -> Self {
        Self::new(NoticeLevel::Success, "Wallet connected.")
    }

    pub fn disconnected() -> Self {
        Self::new(NoticeLevel::Info, "Wallet disconnected.")
    }

    pub fn account_changed() -> Self {
        Self::new(NoticeLevel::Info, "Account changed in wallet. Details updated.")
    }

    pub fn copied() -> Self {
        Self::new(NoticeLevel::Success, "Address copied!")
    }

    pub fn copy_failed(reason: &str) -> Self {
        Self::new(NoticeLevel::Warning, format!("Could not copy address: {}", reason))
    }

    /// Map a session error to what the user sees. `install_url` is offered
    /// when no wallet is present.
    pub fn from_error(err: &SessionError, install_url: &str) -> Self {
        match err.kind() {
            ErrorKind::NoProviderAvailable => Self::new(
                NoticeLevel::Warning,
                format!("No wallet found. Install one to continue: {}", install_url),
            ),
            ErrorKind::NoAccountAuthorized => {
                Self::new(NoticeLevel::Danger, "No account was authorized in the wallet.")
            }
            ErrorKind::UserRejected => {
                Self::new(NoticeLevel::Danger, "Permission not granted or cancelled.")
            }
            ErrorKind::RequestPending => Self::new(
                NoticeLevel::Warning,
                "A wallet request is already pending. Check your wallet.",
            ),
            ErrorKind::Superseded => Self::new(NoticeLevel::Info, "Connection attempt cancelled."),
            ErrorKind::ProviderError => {
                Self::new(NoticeLevel::Danger, format!("Connection cancelled or failed: {}", err))
            }
        }
    }

    /// Success notices fade out on their own.
    pub fn auto_hides(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}
