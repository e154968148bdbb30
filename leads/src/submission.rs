use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{validate, FieldErrors, LeadFields, Subject};
use crate::wire::IntakePayload;

/// Opaque token handed out by the bot-challenge widget.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationToken(String);

impl VerificationToken {
    pub fn new(token: impl Into<String>) -> Self {
        VerificationToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs through Debug on the submission; keep them short there.
impl std::fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "VerificationToken({}…)", prefix)
    }
}

/// Why a submit attempt never left the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub errors: FieldErrors,
    pub challenge_missing: bool,
}

/// A checked, trimmed lead ready to be sent. Built once per submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSubmission {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub email: String,
    pub subject: Subject,
    pub message: String,
    pub consent_timestamp: DateTime<Utc>,
    pub verification_token: VerificationToken,
    pub user_agent: Option<String>,
}

impl LeadSubmission {
    /// Checks the form and the challenge together so both problems surface at once.
    pub fn prepare(
        fields: &LeadFields,
        token: Option<&VerificationToken>,
        consented_at: DateTime<Utc>,
        user_agent: Option<String>,
    ) -> Result<LeadSubmission, Rejection> {
        let errors = validate(fields);
        let subject = fields.subject.parse::<Subject>();

        match (token, subject) {
            (Some(token), Ok(subject)) if errors.is_empty() => {
                let company = fields.company.trim();
                Ok(LeadSubmission {
                    first_name: fields.first_name.trim().to_string(),
                    last_name: fields.last_name.trim().to_string(),
                    company: (!company.is_empty()).then(|| company.to_string()),
                    email: fields.email.trim().to_string(),
                    subject,
                    message: fields.message.trim().to_string(),
                    consent_timestamp: consented_at,
                    verification_token: token.clone(),
                    user_agent,
                })
            }
            _ => Err(Rejection {
                errors,
                challenge_missing: token.is_none(),
            }),
        }
    }

    pub fn to_payload(&self) -> IntakePayload {
        IntakePayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone().unwrap_or_default(),
            email: self.email.clone(),
            subject: self.subject.as_str().to_string(),
            message: self.message.clone(),
            gdpr_consent: true,
            consent_timestamp: Some(self.consent_timestamp),
            recaptcha_token: Some(self.verification_token.as_str().to_string()),
            user_agent: self.user_agent.clone(),
        }
    }
}
