//! Credential signing subsystem.
//!
//! # Design Decisions
//! - Symmetric HS256 key loaded once at startup; construction fails on an empty key
//! - Claims are `iat` and `exp` only; the token is a freshness bound, not a nonce
//! - Minting errors propagate to the pipeline as internal faults

pub mod minter;

pub use minter::{Claims, Credential, CredentialError, CredentialMinter};
