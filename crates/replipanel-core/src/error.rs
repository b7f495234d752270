//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Fragment Transport Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Fragment request failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Form submission failed for {url}: {message}")]
    Submit { url: String, message: String },

    #[error("Malformed fragment: {message}")]
    Fragment { message: String },

    // ─────────────────────────────────────────────────────────────
    // Dialog Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Dialog error: {message}")]
    Dialog { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Profile Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Profile error: {message}")]
    Profile { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn submit(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Submit {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn fragment(message: impl Into<String>) -> Self {
        Self::Fragment {
            message: message.into(),
        }
    }

    pub fn dialog(message: impl Into<String>) -> Self {
        Self::Dialog {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors leave the panel alive with its last good markup;
    /// the caller reports them and waits for the next user action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. }
                | Error::Submit { .. }
                | Error::Fragment { .. }
                | Error::Dialog { .. }
                | Error::Profile { .. }
        )
    }

    /// Check if this error means the panel could not be set up at all
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::ConfigNotFound { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
