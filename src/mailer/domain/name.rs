//! Validated instance names and the default-name convention.

use super::MailerDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Instance name used whenever a caller does not name one explicitly.
pub const DEFAULT_INSTANCE_NAME: &str = "default";

/// Maximum length for an instance name.
const MAX_INSTANCE_NAME_LENGTH: usize = 100;

/// Returns `name` trimmed the way [`InstanceName::new`] trims it, or
/// [`DEFAULT_INSTANCE_NAME`] when it is omitted.
#[must_use]
pub fn instance_or_default(name: Option<&str>) -> &str {
    name.map_or(DEFAULT_INSTANCE_NAME, str::trim)
}

/// Validated mail transport instance name.
///
/// Names are case-sensitive registry keys. The input is trimmed; an empty
/// result or one longer than 100 characters is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceName(String);

impl InstanceName {
    /// Creates a validated instance name.
    ///
    /// # Errors
    ///
    /// Returns [`MailerDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, MailerDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(MailerDomainError::EmptyInstanceName);
        }

        if normalized.chars().count() > MAX_INSTANCE_NAME_LENGTH {
            return Err(MailerDomainError::InstanceNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the name used for instances registered without one.
    #[must_use]
    pub fn default_instance() -> Self {
        Self(DEFAULT_INSTANCE_NAME.to_owned())
    }

    /// Returns the instance name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceName {
    type Error = MailerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstanceName> for String {
    fn from(value: InstanceName) -> Self {
        value.0
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for InstanceName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
