//! JSON bodies exchanged between the contact form and an intake endpoint.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::LeadFields;

/// Body POSTed to the intake endpoint.
///
/// `subject` travels as its lowercase wire value and is kept as a plain string
/// here so the receiving side can report a bad value as a field error instead
/// of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub gdpr_consent: bool,
    #[serde(default)]
    pub consent_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl IntakePayload {
    /// The form values carried by this body, for re-validation on receipt.
    pub fn fields(&self) -> LeadFields {
        LeadFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            consent_given: self.gdpr_consent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConsentRequired,
    ValidationFailed,
    ChallengeFailed,
    RateLimited,
    UpstreamUnavailable,
    #[serde(other)]
    Unknown,
}

/// Error body returned with any non-2xx answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl IntakeErrorBody {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        IntakeErrorBody {
            error: error.into(),
            code: Some(code),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = fields;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeReceipt {
    pub status: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl Default for IntakeReceipt {
    fn default() -> Self {
        IntakeReceipt {
            status: "received".to_string(),
            reference: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_camel_case_keys() {
        let payload = IntakePayload {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: "Analytical Engines".to_string(),
            email: "ada@example.com".to_string(),
            subject: "consultation".to_string(),
            message: "I need help automating our pipeline.".to_string(),
            gdpr_consent: true,
            consent_timestamp: Some("2026-10-19T09:30:00Z".parse().unwrap()),
            recaptcha_token: Some("token-1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["gdprConsent"], true);
        assert_eq!(value["consentTimestamp"], "2026-10-19T09:30:00Z");
        assert_eq!(value["recaptchaToken"], "token-1");
        assert_eq!(value["userAgent"], "Mozilla/5.0");
    }

    #[test]
    fn test_unknown_error_code_still_parses() {
        let body: IntakeErrorBody = serde_json::from_value(json!({
            "error": "quota exceeded",
            "code": "ERROR_CODE_QUOTA"
        }))
        .unwrap();
        assert_eq!(body.code, Some(ErrorCode::Unknown));
        assert!(body.fields.is_empty());
    }

    #[test]
    fn test_consent_error_body_shape() {
        let body = IntakeErrorBody::new(ErrorCode::ConsentRequired, "Consent is required");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"error": "Consent is required", "code": "CONSENT_REQUIRED"}));
    }
}
