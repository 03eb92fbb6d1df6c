//! Session state and credential checks.
//!
//! A session is either anonymous, a logged-in user, or the administrator.
//! Role-gated operations take the session variant as proof: the user menu
//! only exists behind `Session::User`, the catalog mutations behind
//! `Session::Administrator`. Services themselves never re-check roles.

use crate::account::authenticate;
use crate::{Result, Store};

/// Compares a candidate secret against the stored one.
///
/// Kept as a seam so the comparison strategy can change without touching
/// the flows that use it. The shipped implementation is plain equality,
/// matching how the records are stored.
pub trait CredentialVerifier {
    fn verify(&self, candidate: &str, stored: &str) -> bool;
}

/// Byte-for-byte comparison, case-sensitive.
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn verify(&self, candidate: &str, stored: &str) -> bool {
        candidate == stored
    }
}

/// Check a candidate against the configured administrator secret.
pub fn check_admin_secret(
    verifier: &impl CredentialVerifier,
    configured: &str,
    candidate: &str,
) -> bool {
    let ok = verifier.verify(candidate, configured);
    if !ok {
        tracing::warn!("administrator secret rejected");
    }
    ok
}

/// Who the terminal currently speaks for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    User {
        email: String,
    },
    Administrator,
}

impl Session {
    /// Authenticate and move into the user role.
    pub fn login(
        store: &Store,
        verifier: &impl CredentialVerifier,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let account = authenticate(store, verifier, email, password)?;
        tracing::info!(email = %account.email, "user session opened");
        Ok(Session::User {
            email: account.email,
        })
    }

    /// Move into the administrator role if the secret matches.
    pub fn unlock_admin(
        verifier: &impl CredentialVerifier,
        configured: &str,
        candidate: &str,
    ) -> Option<Session> {
        check_admin_secret(verifier, configured, candidate).then_some(Session::Administrator)
    }

    /// Drop back to anonymous, whatever the current role.
    pub fn logout(self) -> Session {
        Session::Anonymous
    }

    /// E-mail of the logged-in user, if any.
    pub fn user_email(&self) -> Option<&str> {
        match self {
            Session::User { email } => Some(email),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Administrator)
    }
}
