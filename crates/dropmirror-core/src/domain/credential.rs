//! Credential model
//!
//! A credential authorizes provider API calls for the duration of a single
//! run. There is no lifecycle management here: tokens are supplied
//! pre-obtained, app key/secret pairs are exchanged once by the provider
//! adapter, and nothing is refreshed or persisted.

use std::fmt::{self, Debug, Formatter};

use super::newtypes::AccessToken;

/// A credential supplied on the command line
#[derive(Clone)]
pub enum Credential {
    /// A pre-obtained access token
    Token(AccessToken),
    /// An app key/secret pair, exchanged for a session token by the provider
    AppKeyPair {
        /// Application key registered with the provider
        app_key: String,
        /// Application secret paired with the key
        app_secret: String,
    },
}

impl Credential {
    /// Short label for log messages ("token" or "app key pair")
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Token(_) => "token",
            Credential::AppKeyPair { .. } => "app key pair",
        }
    }
}

// The secret halves never appear in Debug output.
impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => write!(f, "Credential::Token(****)"),
            Credential::AppKeyPair { app_key, .. } => f
                .debug_struct("Credential::AppKeyPair")
                .field("app_key", app_key)
                .field("app_secret", &"****")
                .finish(),
        }
    }
}
