//! MIME message composition

use lettre::address::{Address, Envelope};
use lettre::message::header::{self, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, Message, MultiPart, SinglePart};

use crate::config::SmtpConfig;
use crate::embed;
use crate::embed::Part;
use crate::error::{EmailError, Result};
use crate::theme::ThemeResourceProvider;

/// `To` header carrying the recipient exactly as supplied by the caller.
///
/// The protocol-level recipient is the validated [`Address`] in the
/// envelope; the header itself is not re-parsed or re-encoded.
#[derive(Debug, Clone)]
struct RawTo(String);

impl Header for RawTo {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("To")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.into()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Build the outbound message: sender, reply-to, verbatim `To` header,
/// subject, send date, envelope, and the `multipart/alternative` body tree
/// with the HTML branch passed through the resource embedder.
///
/// Both bodies may be absent; supplying at least one is the caller's
/// responsibility.
pub fn compose(
    config: &SmtpConfig,
    address: &str,
    subject: &str,
    text_body: Option<&str>,
    html_body: Option<&str>,
    theme: &dyn ThemeResourceProvider,
) -> Result<Message> {
    let from = mailbox(config.from.as_deref(), config.from_display_name.as_deref())?;

    // Reply-To defaults to the sender identity.
    let reply_to = match non_blank(config.reply_to.as_deref()) {
        Some(reply_to) => mailbox(Some(reply_to), config.reply_to_display_name.as_deref())?,
        None => from.clone(),
    };

    let recipient: Address = address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_owned()))?;
    let envelope_from = match non_blank(config.envelope_from.as_deref()) {
        Some(envelope_from) => envelope_from
            .parse()
            .map_err(|_| EmailError::InvalidAddress(envelope_from.to_owned()))?,
        None => from.email.clone(),
    };
    let envelope = Envelope::new(Some(envelope_from), vec![recipient])?;

    let mut alternative = MultiPart::alternative().build();
    if let Some(text) = text_body {
        alternative = alternative.singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(text.to_owned()),
        );
    }
    if let Some(html) = html_body {
        let html_part = SinglePart::builder()
            .header(header::ContentType::TEXT_HTML)
            .body(html.to_owned());
        match embed::embed_resources(html_part, html, theme)? {
            Part::Single(part) => alternative = alternative.singlepart(part),
            Part::Multi(part) => alternative = alternative.multipart(part),
        }
    }

    let message = Message::builder()
        .from(from)
        .reply_to(reply_to)
        .header(RawTo(address.to_owned()))
        .envelope(envelope)
        .subject(subject)
        .date_now()
        .multipart(alternative)?;

    Ok(message)
}

/// Build a mailbox from an address and an optional display name; a blank
/// display name renders the bare address.
fn mailbox(address: Option<&str>, display_name: Option<&str>) -> Result<Mailbox> {
    let address = non_blank(address)
        .ok_or_else(|| EmailError::InvalidAddress(address.unwrap_or_default().to_owned()))?;
    let parsed: Address = address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_owned()))?;
    let name = non_blank(display_name).map(str::to_owned);

    Ok(Mailbox::new(name, parsed))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
