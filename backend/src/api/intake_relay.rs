use std::net::IpAddr;

use diffrenzz_leads::{IntakePayload, LeadSubmission};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayBody {
    #[serde(flatten)]
    payload: IntakePayload,
    ip_address: Option<String>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Forwards accepted leads to a generic JSON intake API (a no-code backend).
pub struct IntakeRelay {
    client: Client,
    url: String,
}

impl IntakeRelay {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    pub async fn submit(
        &self,
        submission: &LeadSubmission,
        client_ip: Option<IpAddr>,
    ) -> Result<(), RelayError> {
        let body = RelayBody {
            payload: submission.to_payload(),
            ip_address: client_ip.map(|ip| ip.to_string()),
        };

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Lead relay failed with {}: {}", status, body);
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        info!("Lead relayed to intake API");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffrenzz_leads::{Subject, VerificationToken};
    use httpmock::prelude::*;

    fn submission() -> LeadSubmission {
        LeadSubmission {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: None,
            email: "ada@example.com".to_string(),
            subject: Subject::Consultation,
            message: "I need help automating our pipeline.".to_string(),
            consent_timestamp: "2026-10-19T09:30:00Z".parse().unwrap(),
            verification_token: VerificationToken::new("token-1"),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    #[tokio::test]
    async fn test_relay_posts_payload_with_server_derived_ip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/lead").json_body_partial(
                r#"{
                    "firstName": "Ada",
                    "subject": "consultation",
                    "gdprConsent": true,
                    "consentTimestamp": "2026-10-19T09:30:00Z",
                    "recaptchaToken": "token-1",
                    "userAgent": "Mozilla/5.0",
                    "ipAddress": "198.51.100.4"
                }"#,
            );
            then.status(200).json_body(serde_json::json!({"id": 17}));
        });

        let relay = IntakeRelay::new(Client::new(), server.url("/api/lead"));
        relay
            .submit(&submission(), Some("198.51.100.4".parse().unwrap()))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_relay_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/lead");
            then.status(500).body("boom");
        });

        let relay = IntakeRelay::new(Client::new(), server.url("/api/lead"));
        let err = relay.submit(&submission(), None).await.unwrap_err();
        assert!(matches!(err, RelayError::Status { status: 500, .. }));
    }
}
