use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diffrenzz_leads::{IntakePayload, IntakeReceipt, LeadSubmission, VerificationToken};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::intake_relay::{IntakeRelay, RelayError};
use crate::api::recaptcha::RecaptchaError;
use crate::api::salesforce::{SalesforceClient, SalesforceError};
use crate::handlers::api_error::ApiError;
use crate::handlers::client_ip::ClientIp;
use crate::AppState;

/// Where accepted leads end up.
pub enum LeadDestination {
    Salesforce(SalesforceClient),
    Relay(IntakeRelay),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Salesforce(#[from] SalesforceError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl LeadDestination {
    pub async fn deliver(
        &self,
        submission: &LeadSubmission,
        client_ip: Option<IpAddr>,
    ) -> Result<(), DeliveryError> {
        match self {
            LeadDestination::Salesforce(client) => {
                client.submit(submission).await?;
            }
            LeadDestination::Relay(relay) => relay.submit(submission, client_ip).await?,
        }
        Ok(())
    }
}

/// Re-checks a posted lead. Consent problems outrank the other field errors.
fn accept(payload: &IntakePayload) -> Result<LeadSubmission, ApiError> {
    let token = payload
        .recaptcha_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(VerificationToken::new);
    let consented_at = payload.consent_timestamp.unwrap_or_else(Utc::now);

    LeadSubmission::prepare(
        &payload.fields(),
        token.as_ref(),
        consented_at,
        payload.user_agent.clone(),
    )
    .map_err(|rejection| {
        if !payload.gdpr_consent {
            ApiError::ConsentRequired(rejection.errors)
        } else if !rejection.errors.is_empty() {
            ApiError::Validation(rejection.errors)
        } else {
            ApiError::ChallengeFailed
        }
    })
}

pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    payload: Result<Json<IntakePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<IntakeReceipt>), ApiError> {
    // Requests without any address share one bucket.
    let limiter_key = client_ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    if !state.rate_limiter.check(limiter_key) {
        return Err(ApiError::RateLimited);
    }

    let Json(payload) = payload.map_err(|rejection| {
        warn!("Malformed lead payload: {}", rejection.body_text());
        ApiError::Malformed(rejection.body_text())
    })?;

    let submission = accept(&payload)?;

    state
        .verifier
        .verify(submission.verification_token.as_str(), client_ip)
        .await
        .map_err(|e| match e {
            RecaptchaError::Rejected(_) => ApiError::ChallengeFailed,
            other => {
                error!("Challenge verification unavailable: {}", other);
                ApiError::Upstream
            }
        })?;

    state
        .destination
        .deliver(&submission, client_ip)
        .await
        .map_err(|e| {
            error!("Failed to deliver lead: {}", e);
            ApiError::Upstream
        })?;

    let reference = Uuid::new_v4().to_string();
    info!(reference = %reference, subject = %submission.subject, "Lead accepted");

    Ok((
        StatusCode::CREATED,
        Json(IntakeReceipt {
            status: "received".to_string(),
            reference: Some(reference),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::recaptcha::RecaptchaVerifier;
    use crate::utils::rate_limit::LeadRateLimiter;
    use axum::{
        body::Body,
        http::{header, Request},
        response::Response,
    };
    use diffrenzz_leads::{ErrorCode, IntakeErrorBody};
    use http_body_util::BodyExt;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::{json, Value};
    use std::num::NonZeroU32;
    use tower::ServiceExt;

    fn state(server: &MockServer, per_minute: u32) -> Arc<AppState> {
        Arc::new(AppState {
            verifier: RecaptchaVerifier::new(
                Client::new(),
                "site-secret".to_string(),
                server.url("/siteverify"),
            ),
            destination: LeadDestination::Relay(IntakeRelay::new(
                Client::new(),
                server.url("/api/lead"),
            )),
            rate_limiter: LeadRateLimiter::per_minute(NonZeroU32::new(per_minute).unwrap()),
            trust_forwarded_headers: true,
        })
    }

    fn payload() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "company": "",
            "email": "ada@example.com",
            "subject": "consultation",
            "message": "I need help automating our pipeline.",
            "gdprConsent": true,
            "consentTimestamp": "2026-10-19T09:30:00Z",
            "recaptchaToken": "token-1",
            "userAgent": "Mozilla/5.0"
        })
    }

    async fn post(state: Arc<AppState>, body: Value) -> Response {
        post_forwarded_for(state, body, "203.0.113.7").await
    }

    async fn post_forwarded_for(state: Arc<AppState>, body: Value, forwarded_for: &str) -> Response {
        crate::router(state, None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/leads")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("X-Forwarded-For", forwarded_for)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn error_body(response: Response) -> IntakeErrorBody {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn siteverify(server: &MockServer, success: bool) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": success}));
        })
    }

    #[tokio::test]
    async fn test_accepted_lead_is_relayed() {
        let server = MockServer::start();
        let verify = server.mock(|when, then| {
            when.method(POST)
                .path("/siteverify")
                .x_www_form_urlencoded_tuple("response", "token-1")
                .x_www_form_urlencoded_tuple("remoteip", "203.0.113.7");
            then.status(200).json_body(json!({"success": true}));
        });
        let relay = server.mock(|when, then| {
            when.method(POST)
                .path("/api/lead")
                .json_body_partial(r#"{"email": "ada@example.com", "ipAddress": "203.0.113.7"}"#);
            then.status(200);
        });

        let response = post(state(&server, 5), payload()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let receipt: IntakeReceipt = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(receipt.status, "received");
        assert!(receipt.reference.is_some());
        verify.assert();
        relay.assert();
    }

    #[tokio::test]
    async fn test_missing_consent_is_rejected_before_any_upstream_call() {
        let server = MockServer::start();
        let verify = siteverify(&server, true);

        let mut body = payload();
        body["gdprConsent"] = json!(false);
        body["email"] = json!("not-an-email");
        let response = post(state(&server, 5), body).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = error_body(response).await;
        assert_eq!(body.code, Some(ErrorCode::ConsentRequired));
        assert!(body.fields.contains_key("gdprConsent"));
        assert!(body.fields.contains_key("email"));
        verify.assert_hits(0);
    }

    #[tokio::test]
    async fn test_field_errors_are_reported() {
        let server = MockServer::start();
        let mut body = payload();
        body["message"] = json!("too short");
        body["subject"] = json!("pricing");
        let response = post(state(&server, 5), body).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = error_body(response).await;
        assert_eq!(body.code, Some(ErrorCode::ValidationFailed));
        assert_eq!(
            body.fields.get("message").map(String::as_str),
            Some("Message must be at least 20 characters")
        );
        assert!(body.fields.contains_key("subject"));
    }

    #[tokio::test]
    async fn test_missing_or_rejected_token_fails_the_challenge() {
        let server = MockServer::start();
        let verify = siteverify(&server, false);

        let mut body = payload();
        body["recaptchaToken"] = json!("");
        let response = post(state(&server, 5), body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, Some(ErrorCode::ChallengeFailed));
        verify.assert_hits(0);

        let response = post(state(&server, 5), payload()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, Some(ErrorCode::ChallengeFailed));
        verify.assert_hits(1);
    }

    #[tokio::test]
    async fn test_destination_failure_is_bad_gateway() {
        let server = MockServer::start();
        siteverify(&server, true);
        server.mock(|when, then| {
            when.method(POST).path("/api/lead");
            then.status(500).body("database is down");
        });

        let response = post(state(&server, 5), payload()).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = error_body(response).await;
        assert_eq!(body.code, Some(ErrorCode::UpstreamUnavailable));
        assert!(!body.error.contains("database"));
    }

    #[tokio::test]
    async fn test_rate_limit_per_address() {
        let server = MockServer::start();
        let state = state(&server, 1);
        let mut body = payload();
        body["gdprConsent"] = json!(false);

        let first = post(state.clone(), body.clone()).await;
        assert_eq!(first.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let second = post(state, body).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error_body(second).await.code, Some(ErrorCode::RateLimited));
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_entries_share_the_proxy_bucket() {
        let server = MockServer::start();
        let state = state(&server, 1);
        let mut body = payload();
        body["gdprConsent"] = json!(false);

        let first = post_forwarded_for(state.clone(), body.clone(), "10.9.9.1, 203.0.113.7").await;
        assert_eq!(first.status(), StatusCode::UNPROCESSABLE_ENTITY);

        for i in 2..5 {
            let forwarded_for = format!("10.9.9.{}, 203.0.113.7", i);
            let response = post_forwarded_for(state.clone(), body.clone(), &forwarded_for).await;
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start();
        let response = post(state(&server, 5), json!({"firstName": 7})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
