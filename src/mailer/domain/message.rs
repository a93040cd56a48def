//! Outbound mail messages and their SMTP envelopes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An outbound mail message.
///
/// Address fields accept either bare addresses or display forms such as
/// `"Fred Foo" <foo@example.com>`, and a single entry may hold a
/// comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl MailMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Adds a carbon-copy recipient.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Adds a blind carbon-copy recipient.
    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Sets the reply-to address.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Adds or replaces a custom header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the sender as given.
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Returns the primary recipients as given.
    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Returns the carbon-copy recipients as given.
    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Returns the blind carbon-copy recipients as given.
    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// Returns the reply-to address.
    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the plain-text body.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the HTML body.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Returns custom headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Derives the SMTP envelope from the address fields.
    ///
    /// Every recipient across `to`, `cc`, and `bcc` is reduced to its bare
    /// address; duplicates keep their first position.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut recipients: Vec<String> = Vec::new();
        for address in self
            .to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .flat_map(|entry| split_addresses(entry))
        {
            if !recipients.contains(&address) {
                recipients.push(address);
            }
        }

        Envelope {
            from: self.from.as_deref().and_then(|from| split_addresses(from).next()),
            to: recipients,
        }
    }
}

/// Sender and recipients used for the SMTP transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Bare sender address.
    pub from: Option<String>,
    /// Bare recipient addresses.
    pub to: Vec<String>,
}

impl Envelope {
    /// Returns the domain part of the sender, if any.
    #[must_use]
    pub fn sender_domain(&self) -> Option<&str> {
        self.from
            .as_deref()
            .and_then(|from| from.rsplit_once('@'))
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }
}

fn split_addresses(entry: &str) -> impl Iterator<Item = String> + '_ {
    address_segments(entry)
        .into_iter()
        .map(bare_address)
        .filter(|address| !address.is_empty())
        .map(str::to_owned)
}

// Commas inside a quoted display name or an angle-bracket address do not
// separate entries.
fn address_segments(entry: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quoted = false;
    let mut bracketed = false;
    let mut start = 0;
    for (offset, character) in entry.char_indices() {
        match character {
            '"' if !bracketed => quoted = !quoted,
            '<' if !quoted => bracketed = true,
            '>' if !quoted => bracketed = false,
            ',' if !quoted && !bracketed => {
                segments.extend(entry.get(start..offset));
                start = offset + character.len_utf8();
            }
            _ => {}
        }
    }
    segments.extend(entry.get(start..));
    segments
}

fn bare_address(entry: &str) -> &str {
    let trimmed = entry.trim();
    trimmed
        .rsplit_once('<')
        .and_then(|(_, rest)| rest.strip_suffix('>'))
        .map_or(trimmed, str::trim)
}
