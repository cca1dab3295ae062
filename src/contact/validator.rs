//! Contact submission validator.
//!
//! Implements the checks a submission must pass before it is forwarded:
//! - Honeypot spam trap (short-circuits everything else)
//! - Required field presence (name, email, subject, message)
//! - Privacy consent
//! - Message length bound

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::contact::payload::{coerce_consent, trimmed, ClientContext, NormalizedPayload};

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 5000;

/// A single reason a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("spam detected")]
    SpamDetected,

    #[error("{} is required", .0.label())]
    MissingField(RequiredField),

    #[error("Privacy consent is required")]
    MissingConsent,

    #[error("Message must be {max} characters or less")]
    MessageTooLong { max: usize },
}

impl ValidationIssue {
    /// Metric label for this kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationIssue::SpamDetected => "spam",
            ValidationIssue::MissingField(_) => "missing_field",
            ValidationIssue::MissingConsent => "consent",
            ValidationIssue::MessageTooLong { .. } => "too_long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    Email,
    Subject,
    Message,
}

impl RequiredField {
    pub const ALL: [RequiredField; 4] = [
        RequiredField::Name,
        RequiredField::Email,
        RequiredField::Subject,
        RequiredField::Message,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Email => "email",
            RequiredField::Subject => "subject",
            RequiredField::Message => "message",
        }
    }

    fn label(self) -> &'static str {
        match self {
            RequiredField::Name => "Name",
            RequiredField::Email => "Email",
            RequiredField::Subject => "Subject",
            RequiredField::Message => "Message",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(NormalizedPayload),
    /// Reasons in the order they were discovered.
    Invalid(Vec<ValidationIssue>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(issues) => issues,
        }
    }
}

/// Join issues the way they are reported to callers.
pub fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Contact submission validator.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    max_message_chars: usize,
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_CHARS)
    }
}

impl SubmissionValidator {
    pub fn new(max_message_chars: usize) -> Self {
        Self { max_message_chars }
    }

    /// Validate a raw submission, stamping the current time on success.
    pub fn validate(&self, body: &Value, ctx: &ClientContext) -> ValidationResult {
        self.validate_at(body, ctx, Utc::now())
    }

    /// Validate a raw submission with an explicit creation time.
    ///
    /// Total over any JSON value: a non-object body is treated as an empty
    /// submission.
    pub fn validate_at(
        &self,
        body: &Value,
        ctx: &ClientContext,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let field = |key: &str| body.get(key);

        if trimmed(field("honeypot")).is_some() {
            return ValidationResult::Invalid(vec![ValidationIssue::SpamDetected]);
        }

        let mut issues = Vec::new();

        for required in RequiredField::ALL {
            if trimmed(field(required.key())).is_none() {
                issues.push(ValidationIssue::MissingField(required));
            }
        }

        if !coerce_consent(field("privacyConsent")) {
            issues.push(ValidationIssue::MissingConsent);
        }

        if let Some(message) = field("message").and_then(Value::as_str) {
            if message.chars().count() > self.max_message_chars {
                issues.push(ValidationIssue::MessageTooLong {
                    max: self.max_message_chars,
                });
            }
        }

        if !issues.is_empty() {
            return ValidationResult::Invalid(issues);
        }

        let required = |key: &str| trimmed(field(key)).unwrap_or_default();

        ValidationResult::Valid(NormalizedPayload {
            name: required("name"),
            email: required("email"),
            subject: required("subject"),
            message: required("message"),
            company: trimmed(field("company")),
            phone: trimmed(field("phone")),
            privacy_consent: true,
            whatsapp_consent: coerce_consent(field("whatsappConsent")),
            user_agent: trimmed(field("userAgent")).or_else(|| {
                ctx.user_agent_header
                    .as_deref()
                    .map(str::trim)
                    .filter(|ua| !ua.is_empty())
                    .map(str::to_string)
            }),
            language: trimmed(field("language")),
            timestamp: trimmed(field("timestamp")),
            ip: ctx.identity.clone(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
