//! Auth9 Mailer - Realm-configurable transactional email
//!
//! This crate sends transactional email on behalf of the identity service:
//! it composes a multipart MIME message (plain/HTML alternative, with
//! theme resources embedded inline via `cid:` references) and drives an
//! SMTP transport whose security posture (plaintext, implicit TLS,
//! STARTTLS, authenticated or anonymous) is derived entirely from the
//! realm's configuration.
//!
//! Secrets, theme resources and trust anchors come from pluggable
//! collaborators ([`SecretVault`], [`ThemeResourceProvider`],
//! [`TruststoreProvider`]); the crate itself keeps no state between sends.

pub mod config;
pub mod embed;
pub mod error;
pub mod message;
pub mod sender;
pub mod theme;
pub mod transport;
pub mod truststore;
pub mod vault;

// Re-export commonly used types
pub use config::SmtpConfig;
pub use error::{EmailError, Result};
pub use sender::{EmailRecipient, EmailSenderProvider, MimeEmailSender};
pub use theme::ThemeResourceProvider;
pub use transport::ConnectionProperties;
pub use truststore::{DefaultTruststore, HostnameVerificationPolicy, TruststoreProvider};
pub use vault::SecretVault;
