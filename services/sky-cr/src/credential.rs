use crate::error::CredentialError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Session token and user id for one run. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    session_token: String,
    user_id: String,
}

impl Credential {
    pub fn new(
        session_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let session_token = session_token.into().trim().to_string();
        let user_id = user_id.into().trim().to_string();

        if session_token.is_empty() {
            return Err(CredentialError::MissingSession);
        }
        if user_id.is_empty() {
            return Err(CredentialError::MissingUser);
        }
        if !is_header_safe(&session_token) {
            return Err(CredentialError::InvalidHeaderValue { field: "session" });
        }
        if !is_header_safe(&user_id) {
            return Err(CredentialError::InvalidHeaderValue { field: "user" });
        }

        Ok(Self {
            session_token,
            user_id,
        })
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| (0x20..0x7f).contains(&b))
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("session_token", &"***REDACTED***")
            .finish()
    }
}

/// `...` followed by the last four characters, for display.
pub fn mask_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_validates() {
        let cred = Credential::new("  tok-123 \n", "user-1").unwrap();
        assert_eq!(cred.session_token(), "tok-123");
        assert_eq!(cred.user_id(), "user-1");

        assert_eq!(
            Credential::new("", "u").unwrap_err(),
            CredentialError::MissingSession
        );
        assert_eq!(
            Credential::new("t", "  ").unwrap_err(),
            CredentialError::MissingUser
        );
        assert!(matches!(
            Credential::new("to\u{7}k", "u"),
            Err(CredentialError::InvalidHeaderValue { field: "session" })
        ));
    }

    #[test]
    fn test_debug_redacts_session() {
        let cred = Credential::new("super-secret", "user-1").unwrap();
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("user-1"));
    }

    #[test]
    fn test_mask_id() {
        assert_eq!(mask_id("abcdef123456"), "...3456");
        assert_eq!(mask_id("ab"), "...ab");
    }
}
