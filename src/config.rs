//! Per-realm SMTP configuration

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EmailError, Result};

/// SMTP settings for one realm.
///
/// Usually parsed once from the realm's flat key/value configuration map
/// via [`SmtpConfig::from_map`]. Recognized keys: `host`, `port`, `auth`,
/// `ssl`, `starttls`, `from`, `fromDisplayName`, `replyTo`,
/// `replyToDisplayName`, `envelopeFrom`, `user`, `password`. Boolean keys
/// are enabled iff the value is exactly `"true"`. Absent keys default to an
/// unauthenticated plaintext session with reply-to equal to the sender and
/// no envelope override.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP server host (`localhost` when absent)
    pub host: Option<String>,
    /// SMTP server port (transport default when absent)
    pub port: Option<u16>,
    /// Authenticate the session with `user`/`password`
    pub auth: bool,
    /// Implicit TLS from the first byte (SMTPS)
    pub ssl: bool,
    /// Opportunistic STARTTLS upgrade
    pub starttls: bool,
    /// Sender address for the `From` header (mandatory at send time)
    pub from: Option<String>,
    /// Display name rendered with the sender address
    pub from_display_name: Option<String>,
    /// Reply-to override; defaults to the sender identity
    pub reply_to: Option<String>,
    /// Display name rendered with the reply-to address
    pub reply_to_display_name: Option<String>,
    /// SMTP envelope sender override, distinct from the `From` header
    pub envelope_from: Option<String>,
    /// Username for authentication
    pub user: Option<String>,
    /// Opaque password reference, resolved through the vault at connect
    /// time and treated as the literal password when the vault has no
    /// entry for it. Never logged.
    pub password: Option<String>,
}

impl SmtpConfig {
    /// Parse the realm's flat configuration map, validating it once at
    /// this boundary. A non-numeric `port` value is rejected; an empty one
    /// is treated as absent.
    pub fn from_map(config: &HashMap<String, String>) -> Result<Self> {
        let port = match config.get("port").filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|_| EmailError::Configuration(format!("invalid smtp port: {raw}")))?,
            ),
            None => None,
        };

        Ok(Self {
            host: config.get("host").cloned(),
            port,
            auth: is_true(config, "auth"),
            ssl: is_true(config, "ssl"),
            starttls: is_true(config, "starttls"),
            from: config.get("from").cloned(),
            from_display_name: config.get("fromDisplayName").cloned(),
            reply_to: config.get("replyTo").cloned(),
            reply_to_display_name: config.get("replyToDisplayName").cloned(),
            envelope_from: config.get("envelopeFrom").cloned(),
            user: config.get("user").cloned(),
            password: config.get("password").cloned(),
        })
    }
}

fn is_true(config: &HashMap<String, String>, key: &str) -> bool {
    config.get(key).map(String::as_str) == Some("true")
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth", &self.auth)
            .field("ssl", &self.ssl)
            .field("starttls", &self.starttls)
            .field("from", &self.from)
            .field("from_display_name", &self.from_display_name)
            .field("reply_to", &self.reply_to)
            .field("reply_to_display_name", &self.reply_to_display_name)
            .field("envelope_from", &self.envelope_from)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
