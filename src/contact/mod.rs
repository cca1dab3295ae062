//! Contact submission handling.
//!
//! # Data Flow
//! ```text
//! raw JSON body + ClientContext
//!     → validator.rs (honeypot, required fields, consent, length)
//!     → payload.rs (NormalizedPayload with explicit nulls)
//!     → relay::forwarder
//! ```

pub mod payload;
pub mod validator;

pub use payload::{coerce_consent, ClientContext, NormalizedPayload};
pub use validator::{
    join_issues, RequiredField, SubmissionValidator, ValidationIssue, ValidationResult,
};
