//! Bearer credential verification for the connection handshake.

mod token;

pub use token::{issue_token, TokenClaims, TokenError, TokenVerifier};
