//! Identity token issuance
//!
//! Tokens are opaque to the rest of the system: the rate limiter keys on the
//! string form and never checks where a token came from. Issued tokens are
//! 256-bit random values encoded as 64 lowercase hex characters.

use std::fmt;

use rand::Rng;

/// Token size in bytes (256-bit)
const TOKEN_SIZE: usize = 32;

/// Freshly issued identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityToken([u8; TOKEN_SIZE]);

impl IdentityToken {
    /// Generate a new random token
    ///
    /// Uses the thread-local CSPRNG from `rand`.
    ///
    /// # Example
    /// ```
    /// # use pixelboard_core::token::IdentityToken;
    /// let token = IdentityToken::generate();
    /// assert_eq!(token.to_hex().len(), 64);
    /// ```
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_SIZE];
        rand::thread_rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Export token as a 64-character lowercase hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
