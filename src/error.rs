//! Unified error handling for the mailer

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, EmailError>;

/// Errors surfaced by the email sender
#[derive(Error, Debug)]
pub enum EmailError {
    /// Malformed or empty sender, reply-to, recipient or envelope address.
    /// Raised while composing, before any network activity.
    #[error("please provide a valid address: {0:?}")]
    InvalidAddress(String),

    /// An embedded resource referenced by the HTML body could not be read.
    /// Raised while composing, before any network activity.
    #[error("error embedding resource {path}")]
    Embedding {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed realm configuration, rejected before a message is built.
    #[error("invalid smtp configuration: {0}")]
    Configuration(String),

    /// MIME assembly failed.
    #[error("failed to build mime message")]
    Message(#[from] lettre::error::Error),

    /// Transport open, STARTTLS upgrade, authentication or transmission
    /// failed, wrapping the underlying cause.
    #[error("failed to send email")]
    Send(#[from] lettre::transport::smtp::Error),
}
