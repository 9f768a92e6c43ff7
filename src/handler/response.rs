//! Navigation results produced by form handlers.

use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A one-shot notification shown after the redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    /// Translation key, not rendered text.
    pub message_key: String,
}

/// Redirect to `url` carrying exactly one flash message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlashRedirect {
    pub url: String,
    pub flash: Flash,
}

impl FlashRedirect {
    pub fn new(url: impl Into<String>, level: FlashLevel, message_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            flash: Flash {
                level,
                message_key: message_key.into(),
            },
        }
    }

    pub fn success(url: impl Into<String>, message_key: impl Into<String>) -> Self {
        Self::new(url, FlashLevel::Success, message_key)
    }
}
