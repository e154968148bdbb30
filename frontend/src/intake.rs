use async_trait::async_trait;
use diffrenzz_leads::{IntakeError, IntakeErrorBody, IntakeReceipt, LeadIntake, LeadSubmission};
use gloo_net::http::Request;
use log::{error, info};

/// Posts leads as JSON to the intake endpoint.
pub struct HttpIntake {
    url: String,
}

impl HttpIntake {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

/// Turns a non-2xx answer into an [`IntakeError`], keeping the error code
/// when the body is the usual `{error, code}` shape.
pub fn rejection(status: u16, body: &str) -> IntakeError {
    match serde_json::from_str::<IntakeErrorBody>(body) {
        Ok(parsed) => IntakeError::Rejected {
            status,
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => IntakeError::Rejected {
            status,
            code: None,
            message: body.chars().take(200).collect(),
        },
    }
}

#[async_trait(?Send)]
impl LeadIntake for HttpIntake {
    async fn submit(&self, submission: &LeadSubmission) -> Result<IntakeReceipt, IntakeError> {
        let response = Request::post(&self.url)
            .json(&submission.to_payload())
            .map_err(|e| IntakeError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| {
                error!("Network error sending lead: {}", e);
                IntakeError::Transport(e.to_string())
            })?;

        if response.ok() {
            info!("Lead accepted with status {}", response.status());
            // Some intake APIs answer 2xx with an empty or foreign body
            let receipt = response.json::<IntakeReceipt>().await.unwrap_or_default();
            return Ok(receipt);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("Lead rejected with status {}: {}", status, body);
        Err(rejection(status, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffrenzz_leads::{ErrorCode, FailureReason};

    #[test]
    fn test_consent_rejection_keeps_code() {
        let err = rejection(422, r#"{"error": "Consent is required", "code": "CONSENT_REQUIRED"}"#);
        assert!(matches!(
            err,
            IntakeError::Rejected { status: 422, code: Some(ErrorCode::ConsentRequired), .. }
        ));
        assert_eq!(err.failure_reason(), FailureReason::ConsentRequired);
    }

    #[test]
    fn test_unparsable_body_is_generic_rejection() {
        let err = rejection(502, "<html>Bad Gateway</html>");
        match err {
            IntakeError::Rejected { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, None);
                assert_eq!(message, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
