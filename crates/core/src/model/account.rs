use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialsError {
    #[error("session token cannot be empty")]
    EmptySession,
    #[error("csrf token cannot be empty")]
    EmptyCsrf,
}

/// Opaque remote-account credential.
///
/// The catalog never inspects these values; it only forwards them to the
/// remote question list. Holding one means "logged in".
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredCredentials")]
pub struct Credentials {
    session: String,
    csrf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all_cookies: Option<String>,
}

impl Credentials {
    /// Create credentials from a session token and CSRF token.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError` if either token is blank.
    pub fn new(
        session: impl Into<String>,
        csrf: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let session = session.into().trim().to_string();
        let csrf = csrf.into().trim().to_string();
        if session.is_empty() {
            return Err(CredentialsError::EmptySession);
        }
        if csrf.is_empty() {
            return Err(CredentialsError::EmptyCsrf);
        }
        Ok(Self {
            session,
            csrf,
            all_cookies: None,
        })
    }

    /// Attach the full cookie header captured alongside the tokens.
    #[must_use]
    pub fn with_all_cookies(mut self, cookies: impl Into<String>) -> Self {
        let cookies = cookies.into();
        self.all_cookies = (!cookies.trim().is_empty()).then_some(cookies);
        self
    }

    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    #[must_use]
    pub fn csrf(&self) -> &str {
        &self.csrf
    }

    #[must_use]
    pub fn all_cookies(&self) -> Option<&str> {
        self.all_cookies.as_deref()
    }
}

/// Unvalidated wire shape; stored values go through [`Credentials::new`].
#[derive(Deserialize)]
struct StoredCredentials {
    session: String,
    csrf: String,
    #[serde(default)]
    all_cookies: Option<String>,
}

impl TryFrom<StoredCredentials> for Credentials {
    type Error = CredentialsError;

    fn try_from(raw: StoredCredentials) -> Result<Self, Self::Error> {
        let creds = Self::new(raw.session, raw.csrf)?;
        Ok(match raw.all_cookies {
            Some(cookies) => creds.with_all_cookies(cookies),
            None => creds,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session", &"<redacted>")
            .field("csrf", &"<redacted>")
            .field("all_cookies", &self.all_cookies.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
