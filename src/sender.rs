//! Send orchestration

use std::sync::Arc;

use lettre::transport::smtp::authentication::{Credentials, DEFAULT_MECHANISMS};
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;

use crate::config::SmtpConfig;
use crate::error::Result;
use crate::message;
use crate::theme::ThemeResourceProvider;
use crate::transport::ConnectionProperties;
use crate::truststore::TruststoreProvider;
use crate::vault::{with_string_secret, SecretVault};

/// Anything that can receive transactional email.
pub trait EmailRecipient {
    /// Primary email address, when one is on file.
    fn email_address(&self) -> Option<&str>;
}

/// Provider contract for realm-configured transactional email.
pub trait EmailSenderProvider: Send + Sync {
    /// Send one message to `address` using the realm's SMTP settings,
    /// blocking until the transport accepts or rejects it.
    fn send(
        &self,
        config: &SmtpConfig,
        address: &str,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
    ) -> Result<()>;

    /// Convenience overload resolving the recipient address from a user
    /// profile before delegating to [`send`](EmailSenderProvider::send).
    fn send_to_user(
        &self,
        config: &SmtpConfig,
        user: &dyn EmailRecipient,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
    ) -> Result<()> {
        self.send(
            config,
            user.email_address().unwrap_or_default(),
            subject,
            text_body,
            html_body,
        )
    }
}

/// Sends MIME email over SMTP according to a realm's configuration.
///
/// Each call derives fresh connection properties, composes the message,
/// opens one SMTP connection, optionally upgrades and authenticates it,
/// transmits, and closes the connection on every exit path. Nothing is
/// shared between sends.
pub struct MimeEmailSender {
    vault: Arc<dyn SecretVault>,
    theme: Arc<dyn ThemeResourceProvider>,
    truststore: Arc<dyn TruststoreProvider>,
}

impl MimeEmailSender {
    pub fn new(
        vault: Arc<dyn SecretVault>,
        theme: Arc<dyn ThemeResourceProvider>,
        truststore: Arc<dyn TruststoreProvider>,
    ) -> Self {
        Self {
            vault,
            theme,
            truststore,
        }
    }

    fn try_send(
        &self,
        config: &SmtpConfig,
        address: &str,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
    ) -> Result<()> {
        let props = ConnectionProperties::from_config(config, self.truststore.as_ref())?;
        let message = message::compose(
            config,
            address,
            subject,
            text_body,
            html_body,
            self.theme.as_ref(),
        )?;

        self.transmit(&props, config, &message)?;
        Ok(())
    }

    /// Open the connection, deliver, and close it regardless of the
    /// delivery outcome. A close failure is logged, never propagated.
    fn transmit(
        &self,
        props: &ConnectionProperties,
        config: &SmtpConfig,
        message: &Message,
    ) -> std::result::Result<(), lettre::transport::smtp::Error> {
        let hello = ClientId::default();
        let wrapper_tls = if props.ssl { props.tls_parameters() } else { None };

        let mut connection = SmtpConnection::connect(
            (props.host.as_str(), props.port),
            Some(props.connect_timeout),
            &hello,
            wrapper_tls,
            None,
        )?;

        let outcome = self.deliver(&mut connection, &hello, props, config, message);

        if !connection.has_broken() {
            if let Err(close_error) = connection.quit() {
                tracing::warn!("failed to close transport: {close_error}");
            }
        }
        outcome
    }

    fn deliver(
        &self,
        connection: &mut SmtpConnection,
        hello: &ClientId,
        props: &ConnectionProperties,
        config: &SmtpConfig,
        message: &Message,
    ) -> std::result::Result<(), lettre::transport::smtp::Error> {
        if props.starttls && connection.can_starttls() {
            if let Some(parameters) = props.tls_parameters() {
                connection.starttls(parameters, hello)?;
            }
        }

        if props.auth {
            let username = config.user.clone().unwrap_or_default();
            let reference = config.password.as_deref().unwrap_or_default();
            with_string_secret(self.vault.as_ref(), reference, |secret| {
                let password = secret.unwrap_or(reference).to_owned();
                connection.auth(DEFAULT_MECHANISMS, &Credentials::new(username, password))
            })?;
        }

        connection.send(message.envelope(), &message.formatted())?;
        Ok(())
    }
}

impl EmailSenderProvider for MimeEmailSender {
    fn send(
        &self,
        config: &SmtpConfig,
        address: &str,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
    ) -> Result<()> {
        self.try_send(config, address, subject, text_body, html_body)
            .map_err(|error| {
                tracing::error!("failed to send email: {error}");
                error
            })
    }
}
