//! Client for the contact relay HTTP API.

mod client;

pub use client::{ContactForm, RelayClient, RelayReply, RelayResponse};
