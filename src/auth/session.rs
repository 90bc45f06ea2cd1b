//! Captured browser session
//!
//! A session is the cookie set of a logged-in browser tab, pasted as a raw
//! `Cookie` header. It is parsed once at startup and never modified.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::constants::{auth, env as env_constants};
use crate::errors::{AuthError, AuthResult};

/// Authentication context bound to one account
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
}

impl Session {
    /// Build a session from named cookie values
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` if there is no non-empty `auth` value.
    pub fn from_cookies<I, K, V>(cookies: I) -> AuthResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cookies: BTreeMap<String, String> = cookies
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        match cookies.get(auth::AUTH_COOKIE) {
            Some(token) if !token.is_empty() => Ok(Self { cookies }),
            _ => Err(AuthError::MissingToken),
        }
    }

    /// Load the session from the `ZVUK_COOKIES` environment variable
    pub fn from_env() -> AuthResult<Self> {
        match env::var(env_constants::COOKIES) {
            Ok(header) => header.parse(),
            Err(env::VarError::NotPresent) => Err(AuthError::MissingToken),
            Err(e) => Err(AuthError::EnvVar(e)),
        }
    }

    /// Value of the `auth` cookie, sent as `x-auth-token`
    pub fn auth_token(&self) -> &str {
        self.cookies
            .get(auth::AUTH_COOKIE)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// All cookies as name/value pairs
    pub fn cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Cookie names, safe to display
    pub fn cookie_names(&self) -> Vec<&str> {
        self.cookies.keys().map(String::as_str).collect()
    }

    /// Commonly captured cookies that are absent from this session
    pub fn missing_known_cookies(&self) -> Vec<&'static str> {
        auth::KNOWN_COOKIES
            .iter()
            .copied()
            .filter(|name| !self.cookies.contains_key(*name))
            .collect()
    }
}

impl FromStr for Session {
    type Err = AuthError;

    /// Parse a raw `Cookie` header: `name=value; name2=value2`
    ///
    /// A leading `Cookie:` prefix, as copied from browser devtools, is accepted.
    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let header = header.trim();
        let header = header
            .strip_prefix("Cookie:")
            .or_else(|| header.strip_prefix("cookie:"))
            .unwrap_or(header);

        let mut cookies = Vec::new();
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').ok_or_else(|| AuthError::InvalidCookie {
                reason: format!("'{}' is not a name=value pair", pair),
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(AuthError::InvalidCookie {
                    reason: "cookie with an empty name".to_string(),
                });
            }
            cookies.push((name.to_string(), value.trim().trim_matches('"').to_string()));
        }

        Self::from_cookies(cookies)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookies", &self.cookie_names())
            .finish()
    }
}
