use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::submission::{LeadSubmission, Rejection};
use crate::wire::{ErrorCode, IntakeReceipt};

/// Something that durably accepts a lead: an HTTP intake API, a test double.
#[async_trait(?Send)]
pub trait LeadIntake {
    async fn submit(&self, submission: &LeadSubmission) -> Result<IntakeReceipt, IntakeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("could not reach the intake endpoint: {0}")]
    Transport(String),
    #[error("intake endpoint answered {status}: {message}")]
    Rejected {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },
    #[error("intake endpoint did not answer within {0:?}")]
    Timeout(Duration),
}

impl IntakeError {
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            IntakeError::Rejected { code: Some(ErrorCode::ConsentRequired), .. } => {
                FailureReason::ConsentRequired
            }
            IntakeError::Rejected { code: Some(ErrorCode::ChallengeFailed), .. } => {
                FailureReason::ChallengeRejected
            }
            IntakeError::Rejected { status, message, .. } => FailureReason::Rejected {
                status: *status,
                message: message.clone(),
            },
            IntakeError::Transport(message) => FailureReason::Transport(message.clone()),
            IntakeError::Timeout(_) => FailureReason::Timeout,
        }
    }
}

/// Why the last submission ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    ConsentRequired,
    ChallengeRejected,
    Timeout,
    Rejected { status: u16, message: String },
    Transport(String),
}

impl FailureReason {
    /// Text for the visitor. Upstream detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            FailureReason::ConsentRequired => {
                "Please agree to the processing of your data so we can reply".to_string()
            }
            FailureReason::ChallengeRejected => {
                "The verification expired. Please complete it again.".to_string()
            }
            FailureReason::Timeout => {
                "The server took too long to answer. Please try again in a moment.".to_string()
            }
            FailureReason::Rejected { status, .. } if *status == 429 => {
                "Too many messages in a short time. Please wait a minute and try again."
                    .to_string()
            }
            FailureReason::Rejected { .. } | FailureReason::Transport(_) => {
                "Something went wrong sending your message. Please try again or email us directly."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("the form is incomplete or the challenge is missing")]
    Invalid(Rejection),
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(code: Option<ErrorCode>) -> IntakeError {
        IntakeError::Rejected {
            status: 422,
            code,
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_failure_reason_mapping() {
        assert_eq!(
            rejected(Some(ErrorCode::ConsentRequired)).failure_reason(),
            FailureReason::ConsentRequired
        );
        assert_eq!(
            rejected(Some(ErrorCode::ChallengeFailed)).failure_reason(),
            FailureReason::ChallengeRejected
        );
        assert_eq!(
            rejected(None).failure_reason(),
            FailureReason::Rejected { status: 422, message: "nope".to_string() }
        );
        assert_eq!(
            IntakeError::Timeout(Duration::from_secs(20)).failure_reason(),
            FailureReason::Timeout
        );
    }

    #[test]
    fn test_rate_limit_has_its_own_message() {
        let reason = FailureReason::Rejected { status: 429, message: String::new() };
        assert!(reason.user_message().contains("wait a minute"));
    }
}
