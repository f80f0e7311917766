//! Inline embedding of `cid:`-referenced resources into HTML bodies

use std::collections::HashSet;

use lazy_static::lazy_static;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, MultiPart, SinglePart};
use regex::Regex;

use crate::error::{EmailError, Result};
use crate::theme::ThemeResourceProvider;

/// A MIME body leaf that is either a single part or a `multipart/*` tree.
///
/// `lettre::message::Part` serves this exact role but is not part of its
/// public API, so this crate defines its own equivalent.
#[derive(Debug, Clone)]
pub enum Part {
    Single(SinglePart),
    Multi(MultiPart),
}

impl Part {
    pub fn formatted(&self) -> Vec<u8> {
        match self {
            Part::Single(part) => part.formatted(),
            Part::Multi(part) => part.formatted(),
        }
    }
}

lazy_static! {
    /// Matches `cid:<token>` references enclosed in single or double quotes.
    static ref CID_PATTERN: Regex = Regex::new(r#"["']cid:(.*?)["']"#).unwrap();
}

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Scan `html_body` for `cid:` references and resolve each distinct token
/// through the theme.
///
/// With no references the original HTML leaf is returned untouched.
/// Otherwise the leaf is wrapped in a `multipart/related` tree carrying one
/// inline part per resolved token. Tokens unknown to the theme are skipped;
/// a read failure aborts the whole message.
pub fn embed_resources(
    html_part: SinglePart,
    html_body: &str,
    theme: &dyn ThemeResourceProvider,
) -> Result<Part> {
    let mut paths = HashSet::new();
    for captures in CID_PATTERN.captures_iter(html_body) {
        let path = &captures[1];
        tracing::debug!("found cid path: {path}");
        paths.insert(path.to_owned());
    }

    if paths.is_empty() {
        return Ok(Part::Single(html_part));
    }

    let mut related = MultiPart::related().singlepart(html_part);
    for path in &paths {
        match theme.resource(path) {
            Ok(Some(bytes)) => related = related.singlepart(inline_part(path, bytes)),
            Ok(None) => tracing::debug!("no theme resource for cid path: {path}"),
            Err(source) => {
                tracing::debug!("couldn't add: {path}");
                return Err(EmailError::Embedding {
                    path: path.clone(),
                    source,
                });
            }
        }
    }

    Ok(Part::Multi(related))
}

fn inline_part(path: &str, bytes: Vec<u8>) -> SinglePart {
    let content_type = mime_guess::from_path(path)
        .first_raw()
        .and_then(|mime| ContentType::parse(mime).ok())
        .unwrap_or_else(|| ContentType::parse(FALLBACK_CONTENT_TYPE).unwrap());

    Attachment::new_inline(path.to_owned()).body(Body::new(bytes), content_type)
}
