//! Error types for the provider seam

use thiserror::Error;

/// Errors surfaced by a monitoring backend.
///
/// Providers fail at open time (subsystem initialization) or become
/// unavailable later; accessors on an already-open tree are infallible by
/// design and degrade to absent readings instead of erroring.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend failed to initialize its enumeration subsystem
    #[error("provider initialization failed: {message}")]
    Init { message: String },

    /// The backend is not usable on this host or in this configuration
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },
}

impl ProviderError {
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
