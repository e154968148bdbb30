use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_MESSAGE_CHARS: usize = 20;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern must compile")
});

/// Every input the contact form collects, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Company,
    Email,
    Subject,
    Message,
    Consent,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::Company,
        Field::Email,
        Field::Subject,
        Field::Message,
        Field::Consent,
    ];

    /// Name used for this field in JSON bodies.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Company => "company",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::Consent => "gdprConsent",
        }
    }

    pub fn label(self) -> &'static str {
        FIELD_SCHEMA
            .iter()
            .find(|rule| rule.field == self)
            .map(|rule| rule.label)
            .unwrap_or("Field")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Consultation,
    Implementation,
    Integration,
    Other,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Consultation,
        Subject::Implementation,
        Subject::Integration,
        Subject::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Consultation => "consultation",
            Subject::Implementation => "implementation",
            Subject::Integration => "integration",
            Subject::Other => "other",
        }
    }

    /// Text shown in the subject dropdown.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Consultation => "Salesforce Consultation",
            Subject::Implementation => "Implementation Help",
            Subject::Integration => "System Integration",
            Subject::Other => "Other Inquiry",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subject '{0}'")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownSubject(value.to_string()))
    }
}

/// Raw values as typed by the visitor. Nothing here is trimmed or checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFields {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub consent_given: bool,
}

impl LeadFields {
    /// Text value of a field. The consent checkbox reads as "true"/"false".
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::FirstName => self.first_name.clone(),
            Field::LastName => self.last_name.clone(),
            Field::Company => self.company.clone(),
            Field::Email => self.email.clone(),
            Field::Subject => self.subject.clone(),
            Field::Message => self.message.clone(),
            Field::Consent => self.consent_given.to_string(),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Company => self.company = value,
            Field::Email => self.email = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
            Field::Consent => self.consent_given = value.trim().eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidFormat,
    TooShort { min: usize },
    ConsentRequired,
}

impl FieldError {
    pub fn message(self, field: Field) -> String {
        match self {
            FieldError::Required => format!("{} is required", field.label()),
            FieldError::InvalidFormat => "Invalid email address".to_string(),
            FieldError::TooShort { min } => {
                format!("{} must be at least {} characters", field.label(), min)
            }
            FieldError::ConsentRequired => {
                "Please agree to the processing of your data so we can reply".to_string()
            }
        }
    }
}

/// One entry per schema field: `None` when the field passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, Option<FieldError>>);

impl Default for FieldErrors {
    fn default() -> Self {
        FieldErrors(Field::ALL.into_iter().map(|field| (field, None)).collect())
    }
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied().flatten()
    }

    pub fn set(&mut self, field: Field, error: FieldError) {
        self.0.insert(field, Some(error));
    }

    pub fn clear(&mut self, field: Field) {
        self.0.insert(field, None);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Option::is_none)
    }

    /// Only the failing fields, in display order.
    pub fn failing(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0
            .iter()
            .filter_map(|(field, error)| error.map(|error| (*field, error)))
    }

    /// Failing fields keyed by wire name with human messages.
    pub fn to_messages(&self) -> BTreeMap<String, String> {
        self.failing()
            .map(|(field, error)| (field.wire_name().to_string(), error.message(field)))
            .collect()
    }
}

type Check = fn(&LeadFields) -> Option<FieldError>;

pub struct FieldRule {
    pub field: Field,
    pub label: &'static str,
    pub check: Check,
}

pub static FIELD_SCHEMA: [FieldRule; 7] = [
    FieldRule { field: Field::FirstName, label: "First name", check: check_first_name },
    FieldRule { field: Field::LastName, label: "Last name", check: check_last_name },
    FieldRule { field: Field::Company, label: "Company", check: check_company },
    FieldRule { field: Field::Email, label: "Email", check: check_email },
    FieldRule { field: Field::Subject, label: "Subject", check: check_subject },
    FieldRule { field: Field::Message, label: "Message", check: check_message },
    FieldRule { field: Field::Consent, label: "Consent", check: check_consent },
];

/// Runs every rule of [`FIELD_SCHEMA`]; all failures are reported together.
pub fn validate(fields: &LeadFields) -> FieldErrors {
    FieldErrors(
        FIELD_SCHEMA
            .iter()
            .map(|rule| (rule.field, (rule.check)(fields)))
            .collect(),
    )
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

fn required(value: &str) -> Option<FieldError> {
    value.trim().is_empty().then_some(FieldError::Required)
}

fn check_first_name(fields: &LeadFields) -> Option<FieldError> {
    required(&fields.first_name)
}

fn check_last_name(fields: &LeadFields) -> Option<FieldError> {
    required(&fields.last_name)
}

fn check_company(_fields: &LeadFields) -> Option<FieldError> {
    None
}

fn check_email(fields: &LeadFields) -> Option<FieldError> {
    required(&fields.email)
        .or_else(|| (!is_valid_email(&fields.email)).then_some(FieldError::InvalidFormat))
}

fn check_subject(fields: &LeadFields) -> Option<FieldError> {
    required(&fields.subject).or_else(|| {
        fields
            .subject
            .parse::<Subject>()
            .err()
            .map(|_| FieldError::Required)
    })
}

fn check_message(fields: &LeadFields) -> Option<FieldError> {
    required(&fields.message).or_else(|| {
        (fields.message.trim().chars().count() < MIN_MESSAGE_CHARS)
            .then_some(FieldError::TooShort { min: MIN_MESSAGE_CHARS })
    })
}

fn check_consent(fields: &LeadFields) -> Option<FieldError> {
    (!fields.consent_given).then_some(FieldError::ConsentRequired)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> LeadFields {
        LeadFields {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: String::new(),
            email: "ada@example.com".to_string(),
            subject: "consultation".to_string(),
            message: "I need help automating our pipeline.".to_string(),
            consent_given: true,
        }
    }

    #[test]
    fn test_complete_form_passes() {
        let errors = validate(&complete());
        assert!(errors.is_empty());
        assert_eq!(errors.failing().count(), 0);
    }

    #[test]
    fn test_every_missing_field_reported_at_once() {
        let errors = validate(&LeadFields::default());
        let failing: Vec<_> = errors.failing().collect();
        assert_eq!(
            failing,
            vec![
                (Field::FirstName, FieldError::Required),
                (Field::LastName, FieldError::Required),
                (Field::Email, FieldError::Required),
                (Field::Subject, FieldError::Required),
                (Field::Message, FieldError::Required),
                (Field::Consent, FieldError::ConsentRequired),
            ]
        );
        assert_eq!(errors.get(Field::Company), None);
    }

    #[test]
    fn test_whitespace_only_names_are_missing() {
        let mut fields = complete();
        fields.first_name = "   ".to_string();
        fields.last_name = "\t".to_string();
        let errors = validate(&fields);
        assert_eq!(errors.get(Field::FirstName), Some(FieldError::Required));
        assert_eq!(errors.get(Field::LastName), Some(FieldError::Required));
        assert_eq!(errors.failing().count(), 2);
    }

    #[test]
    fn test_message_length_boundary() {
        let mut fields = complete();
        fields.message = "a".repeat(20);
        assert_eq!(validate(&fields).get(Field::Message), None);

        fields.message = "a".repeat(19);
        assert_eq!(
            validate(&fields).get(Field::Message),
            Some(FieldError::TooShort { min: 20 })
        );

        // Surrounding whitespace does not count towards the minimum.
        fields.message = format!("  {}  ", "a".repeat(19));
        assert_eq!(
            validate(&fields).get(Field::Message),
            Some(FieldError::TooShort { min: 20 })
        );
    }

    #[test]
    fn test_message_length_counts_characters() {
        let mut fields = complete();
        fields.message = "é".repeat(20);
        assert_eq!(validate(&fields).get(Field::Message), None);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("ADA.L+crm@mail.example.CO"));
        assert!(is_valid_email("  ada@example.com "));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada@exa mple.com"));
        assert!(!is_valid_email("ada@example.c"));

        let mut fields = complete();
        fields.email = "not-an-email".to_string();
        assert_eq!(validate(&fields).get(Field::Email), Some(FieldError::InvalidFormat));
    }

    #[test]
    fn test_subject_must_be_in_closed_set() {
        let mut fields = complete();
        fields.subject = "partnership".to_string();
        assert_eq!(validate(&fields).get(Field::Subject), Some(FieldError::Required));

        fields.subject = "Integration".to_string();
        assert_eq!(validate(&fields).get(Field::Subject), None);
        assert_eq!("Integration".parse::<Subject>(), Ok(Subject::Integration));
    }

    #[test]
    fn test_consent_must_be_given() {
        let mut fields = complete();
        fields.consent_given = false;
        let errors = validate(&fields);
        assert_eq!(errors.get(Field::Consent), Some(FieldError::ConsentRequired));
        assert_eq!(errors.failing().count(), 1);
    }

    #[test]
    fn test_messages_keyed_by_wire_name() {
        let mut fields = complete();
        fields.email = String::new();
        fields.message = "too short".to_string();
        let messages = validate(&fields).to_messages();
        assert_eq!(messages.get("email").map(String::as_str), Some("Email is required"));
        assert_eq!(
            messages.get("message").map(String::as_str),
            Some("Message must be at least 20 characters")
        );
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_unknown_subject_error() {
        let err = "partnership".parse::<Subject>().unwrap_err();
        assert_eq!(err, UnknownSubject("partnership".to_string()));
        assert_eq!(err.to_string(), "unknown subject 'partnership'");
        let _: &dyn std::error::Error = &err;
    }
}
